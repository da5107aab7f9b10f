use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "room_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Support,
    Direct,
    Order,
    Booking,
}

/// Who a participant is acting as. Doubles as the `sender_type` of a
/// message: a participant always writes under their own role.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "participant_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Customer,
    Admin,
    Teknisi,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RoomEntity {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub _type: RoomType,
    pub customer_id: Uuid,
    pub teknisi_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub name: Option<String>,
    /// Denormalized copy of the most recent message. Written only inside
    /// the message-send transaction, never edited independently.
    pub last_message: Option<String>,
    pub last_message_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_sender_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RoomEntity {
    /// Role-scoped visibility rule. Admins additionally see unassigned
    /// support rooms so any of them can triage first contact.
    pub fn visible_to(&self, participant_id: &Uuid, role: &ParticipantRole) -> bool {
        match role {
            ParticipantRole::Customer => self.customer_id == *participant_id,
            ParticipantRole::Teknisi => self.teknisi_id.as_ref() == Some(participant_id),
            ParticipantRole::Admin => {
                self.admin_id.as_ref() == Some(participant_id)
                    || (self._type == RoomType::Support && self.admin_id.is_none())
            }
        }
    }

    /// Every identity attached to the room. Used by the notification
    /// fan-out to pick message recipients.
    pub fn participant_ids(&self) -> Vec<Uuid> {
        let mut ids = vec![self.customer_id];
        ids.extend(self.teknisi_id);
        ids.extend(self.admin_id);
        ids
    }

    pub fn recipients_of(&self, sender_id: &Uuid) -> Vec<Uuid> {
        self.participant_ids().into_iter().filter(|id| id != sender_id).collect()
    }

    /// Display title: explicit name, then the last counterpart we saw
    /// talking, then a type-based label.
    pub fn title(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if self._type == RoomType::Support {
            return "Customer Support".to_string();
        }
        if let Some(sender) = &self.last_sender_name {
            return sender.clone();
        }
        match self._type {
            RoomType::Order => "Order chat".to_string(),
            RoomType::Booking => "Booking chat".to_string(),
            _ => "Chat".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(_type: RoomType) -> RoomEntity {
        RoomEntity {
            id: Uuid::now_v7(),
            _type,
            customer_id: Uuid::now_v7(),
            teknisi_id: None,
            admin_id: None,
            order_id: None,
            booking_id: None,
            name: None,
            last_message: None,
            last_message_at: None,
            last_sender_name: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_customer_sees_only_own_rooms() {
        let r = room(RoomType::Direct);
        assert!(r.visible_to(&r.customer_id, &ParticipantRole::Customer));
        assert!(!r.visible_to(&Uuid::now_v7(), &ParticipantRole::Customer));
    }

    #[test]
    fn test_teknisi_sees_only_assigned_rooms() {
        let mut r = room(RoomType::Booking);
        let teknisi = Uuid::now_v7();
        assert!(!r.visible_to(&teknisi, &ParticipantRole::Teknisi));

        r.teknisi_id = Some(teknisi);
        assert!(r.visible_to(&teknisi, &ParticipantRole::Teknisi));
        assert!(!r.visible_to(&Uuid::now_v7(), &ParticipantRole::Teknisi));
    }

    #[test]
    fn test_any_admin_sees_unassigned_support_room() {
        let mut r = room(RoomType::Support);
        let admin_a = Uuid::now_v7();
        let admin_b = Uuid::now_v7();
        assert!(r.visible_to(&admin_a, &ParticipantRole::Admin));
        assert!(r.visible_to(&admin_b, &ParticipantRole::Admin));

        // Once assigned only that admin sees it
        r.admin_id = Some(admin_a);
        assert!(r.visible_to(&admin_a, &ParticipantRole::Admin));
        assert!(!r.visible_to(&admin_b, &ParticipantRole::Admin));
    }

    #[test]
    fn test_unassigned_direct_room_hidden_from_admins() {
        let r = room(RoomType::Direct);
        assert!(!r.visible_to(&Uuid::now_v7(), &ParticipantRole::Admin));
    }

    #[test]
    fn test_recipients_exclude_sender() {
        let mut r = room(RoomType::Order);
        let teknisi = Uuid::now_v7();
        r.teknisi_id = Some(teknisi);

        let recipients = r.recipients_of(&r.customer_id);
        assert_eq!(recipients, vec![teknisi]);

        let recipients = r.recipients_of(&teknisi);
        assert_eq!(recipients, vec![r.customer_id]);
    }

    #[test]
    fn test_title_fallback_chain() {
        let mut r = room(RoomType::Support);
        assert_eq!(r.title(), "Customer Support");

        r._type = RoomType::Order;
        assert_eq!(r.title(), "Order chat");

        r.last_sender_name = Some("Budi".to_string());
        assert_eq!(r.title(), "Budi");

        r.name = Some("Warranty follow-up".to_string());
        assert_eq!(r.title(), "Warranty follow-up");
    }
}
