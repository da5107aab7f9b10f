use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Order,
    Booking,
    Target,
    Chat,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NotificationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub _type: NotificationType,
    pub title: String,
    pub message: String,
    /// Loose reference to the triggering order/booking/room; no enforced
    /// referential integrity.
    pub related_id: Option<Uuid>,
    /// Independent of chat message read-state.
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
