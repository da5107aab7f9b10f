use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::message::schema::MessageEntity;
use crate::modules::notification::schema::{NotificationEntity, NotificationType};
use crate::modules::realtime::feed::{RowEvent, RowOp, Table};

/// How many entries the bell dropdown shows; a presentation limit, not a
/// deletion policy.
pub const RECENT_WINDOW: i64 = 5;

#[derive(Debug, Clone)]
pub struct InsertNotification {
    pub user_id: Uuid,
    pub _type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkAllRead {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationEntity>,
    pub unread_count: i64,
}

/// Row shape published by the order/booking/target subsystems through the
/// events intake.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainRow {
    pub id: Uuid,
    #[serde(alias = "customer_id")]
    pub user_id: Uuid,
    pub status: String,
}

/// One notification per new message, per recipient.
pub fn notification_for_message(message: &MessageEntity, recipient: Uuid) -> InsertNotification {
    InsertNotification {
        user_id: recipient,
        _type: NotificationType::Chat,
        title: "New message".to_string(),
        message: format!("{}: {}", message.sender_name, message.message),
        related_id: Some(message.room_id),
    }
}

/// Derive a notification from an order/booking/target row event, if that
/// event warrants one. Target rows only notify on the "achieved" flip.
pub fn notification_for_domain_event(event: &RowEvent) -> Option<InsertNotification> {
    let row: DomainRow = serde_json::from_value(event.row.clone()).ok()?;

    match event.table {
        Table::Orders if event.op == RowOp::Update => Some(InsertNotification {
            user_id: row.user_id,
            _type: NotificationType::Order,
            title: "Order update".to_string(),
            message: format!("Your order status changed to {}", row.status),
            related_id: Some(row.id),
        }),
        Table::Bookings if event.op == RowOp::Update => Some(InsertNotification {
            user_id: row.user_id,
            _type: NotificationType::Booking,
            title: "Service booking update".to_string(),
            message: format!("Your booking progressed to {}", row.status),
            related_id: Some(row.id),
        }),
        Table::Targets if row.status == "achieved" => Some(InsertNotification {
            user_id: row.user_id,
            _type: NotificationType::Target,
            title: "Spending target achieved".to_string(),
            message: "Congratulations, you reached your spending target!".to_string(),
            related_id: Some(row.id),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::room::schema::ParticipantRole;

    fn order_event(op: RowOp, status: &str) -> RowEvent {
        RowEvent {
            op,
            table: Table::Orders,
            row: serde_json::json!({
                "id": Uuid::now_v7(),
                "customer_id": Uuid::now_v7(),
                "status": status,
            }),
        }
    }

    #[test]
    fn test_order_status_update_notifies_customer() {
        let n = notification_for_domain_event(&order_event(RowOp::Update, "shipped")).unwrap();
        assert_eq!(n._type, NotificationType::Order);
        assert!(n.message.contains("shipped"));
        assert!(n.related_id.is_some());
    }

    #[test]
    fn test_order_insert_does_not_notify() {
        assert!(notification_for_domain_event(&order_event(RowOp::Insert, "new")).is_none());
    }

    #[test]
    fn test_target_only_notifies_on_achieved() {
        let user = Uuid::now_v7();
        let mk = |status: &str| RowEvent {
            op: RowOp::Update,
            table: Table::Targets,
            row: serde_json::json!({"id": Uuid::now_v7(), "user_id": user, "status": status}),
        };

        assert!(notification_for_domain_event(&mk("in_progress")).is_none());
        let n = notification_for_domain_event(&mk("achieved")).unwrap();
        assert_eq!(n._type, NotificationType::Target);
        assert_eq!(n.user_id, user);
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let ev = RowEvent { op: RowOp::Update, table: Table::Orders, row: serde_json::json!({}) };
        assert!(notification_for_domain_event(&ev).is_none());
    }

    #[test]
    fn test_message_notification_carries_sender_and_room() {
        let recipient = Uuid::now_v7();
        let message = MessageEntity {
            id: Uuid::now_v7(),
            room_id: Uuid::now_v7(),
            sender_type: ParticipantRole::Teknisi,
            sender_id: Uuid::now_v7(),
            sender_name: "Agus".to_string(),
            message: "Unit anda sudah selesai".to_string(),
            is_read: false,
            created_at: chrono::Utc::now(),
        };

        let n = notification_for_message(&message, recipient);
        assert_eq!(n.user_id, recipient);
        assert_eq!(n._type, NotificationType::Chat);
        assert_eq!(n.related_id, Some(message.room_id));
        assert!(n.message.starts_with("Agus: "));
    }
}
