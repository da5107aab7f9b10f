use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;
use validator::Validate;

use crate::modules::message::schema::MessageEntity;
use crate::modules::room::schema::ParticipantRole;

/// Consecutive messages within this window share one timestamp marker in
/// the conversation view.
pub const TIMESTAMP_GROUP_WINDOW: chrono::Duration = chrono::Duration::minutes(5);

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessage {
    pub sender_type: ParticipantRole,
    pub sender_id: Uuid,
    pub sender_name: String,
    #[validate(length(min = 1, message = "Message text must not be empty"))]
    pub message: String,
}

impl SendMessage {
    pub fn is_blank(&self) -> bool {
        self.message.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub room_id: Uuid,
    pub sender_type: ParticipantRole,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkAsRead {
    pub reader_id: Uuid,
}

/// Payload of the mark-as-read change event. Carries the room and reader,
/// not individual message ids: mark-as-read is a set operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub room_id: Uuid,
    pub reader_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: MessageEntity,
    /// Presentation flag for the 5-minute timestamp grouping rule.
    pub show_timestamp: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageView>,
}

/// Total order within a room: `created_at`, then id. Uuid v7 ids are
/// time-ordered, so the id tie-break is the insertion sequence. Arrival
/// order is never part of the contract.
pub fn chronological(a: &MessageEntity, b: &MessageEntity) -> Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

/// Annotate an oldest-first message list with timestamp markers.
pub fn flag_timestamps(messages: Vec<MessageEntity>) -> Vec<MessageView> {
    let mut views = Vec::with_capacity(messages.len());
    let mut last_marker: Option<chrono::DateTime<chrono::Utc>> = None;

    for message in messages {
        let show_timestamp = match last_marker {
            Some(marker) => message.created_at - marker >= TIMESTAMP_GROUP_WINDOW,
            None => true,
        };
        if show_timestamp {
            last_marker = Some(message.created_at);
        }
        views.push(MessageView { message, show_timestamp });
    }

    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn message_at(ts: chrono::DateTime<chrono::Utc>) -> MessageEntity {
        MessageEntity {
            id: Uuid::now_v7(),
            room_id: Uuid::now_v7(),
            sender_type: ParticipantRole::Customer,
            sender_id: Uuid::now_v7(),
            sender_name: "Sari".to_string(),
            message: "halo".to_string(),
            is_read: false,
            created_at: ts,
        }
    }

    #[test]
    fn test_blank_detection_covers_whitespace() {
        let mut body = SendMessage {
            sender_type: ParticipantRole::Customer,
            sender_id: Uuid::now_v7(),
            sender_name: "Sari".to_string(),
            message: "  \t\n ".to_string(),
        };
        assert!(body.is_blank());

        body.message = " ok ".to_string();
        assert!(!body.is_blank());
    }

    #[test]
    fn test_chronological_ignores_arrival_order() {
        let t0 = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 5).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 9).unwrap();

        let a = message_at(t0);
        let b = message_at(t1);
        let c = message_at(t2);

        // delivered out of order
        let mut arrived = vec![c.clone(), a.clone(), b.clone()];
        arrived.sort_by(chronological);

        let ids: Vec<_> = arrived.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_chronological_tie_breaks_by_id() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let a = message_at(ts);
        let b = message_at(ts); // same timestamp, later v7 id

        let mut arrived = vec![b.clone(), a.clone()];
        arrived.sort_by(chronological);
        assert_eq!(arrived[0].id, a.id.min(b.id));
        assert_eq!(arrived[1].id, a.id.max(b.id));
    }

    #[test]
    fn test_timestamp_grouping_window() {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let messages = vec![
            message_at(base),
            message_at(base + chrono::Duration::minutes(2)),
            message_at(base + chrono::Duration::minutes(4)),
            message_at(base + chrono::Duration::minutes(6)),
            message_at(base + chrono::Duration::minutes(12)),
        ];

        let flags: Vec<bool> = flag_timestamps(messages).iter().map(|v| v.show_timestamp).collect();
        // 0: first marker; 1,2: inside the window of 0; 3: 6 min after 0,
        // new marker; 4: 6 min after 3, new marker.
        assert_eq!(flags, vec![true, false, false, true, true]);
    }

    #[test]
    fn test_empty_list_flags_nothing() {
        assert!(flag_timestamps(Vec::new()).is_empty());
    }
}
