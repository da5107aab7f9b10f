use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::api::error;
use crate::modules::room::schema::{ParticipantRole, RoomEntity, RoomType};

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
    #[serde(rename = "type")]
    pub _type: RoomType,
    pub customer_id: Uuid,
    pub teknisi_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub name: Option<String>,
}

impl NewRoom {
    /// Context-bound room types must carry their foreign id. Checked
    /// before any persistence attempt.
    pub fn validate_context(&self) -> Result<(), error::SystemError> {
        match self._type {
            RoomType::Order if self.order_id.is_none() => {
                Err(error::SystemError::bad_request("order_id is required for order rooms"))
            }
            RoomType::Booking if self.booking_id.is_none() => {
                Err(error::SystemError::bad_request("booking_id is required for booking rooms"))
            }
            _ => Ok(()),
        }
    }

    /// Whether create must return an existing room for the same context
    /// instead of a duplicate. Support/direct rooms may multiply.
    pub fn is_context_bound(&self) -> bool {
        matches!(self._type, RoomType::Order | RoomType::Booking)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomListQuery {
    pub participant_id: Uuid,
    pub role: ParticipantRole,
}

/// Raw listing row: full room columns plus the viewer-relative unread
/// aggregate computed in the same query.
#[derive(Debug, Clone, FromRow)]
pub struct RoomUnreadRaw {
    #[sqlx(flatten)]
    pub room: RoomEntity,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    #[serde(flatten)]
    pub room: RoomEntity,
    pub title: String,
    pub unread_count: i64,
}

impl From<RoomUnreadRaw> for RoomView {
    fn from(raw: RoomUnreadRaw) -> Self {
        let title = raw.room.title();
        RoomView { room: raw.room, title, unread_count: raw.unread_count }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomView>,
    pub total_unread: i64,
}
