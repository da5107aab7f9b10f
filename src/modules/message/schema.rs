use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::room::schema::ParticipantRole;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MessageEntity {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_type: ParticipantRole,
    pub sender_id: Uuid,
    /// Denormalized at send time; renames do not rewrite history.
    pub sender_name: String,
    pub message: String,
    /// Set by the recipient side, transitions false -> true only.
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
