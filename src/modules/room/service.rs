use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::realtime::feed::{ChangeFeed, RowEvent, Table};
use crate::modules::room::model::{NewRoom, RoomListResponse, RoomView};
use crate::modules::room::repository::RoomRepository;
use crate::modules::room::schema::{ParticipantRole, RoomEntity};

#[derive(Clone)]
pub struct RoomService<R>
where
    R: RoomRepository + Send + Sync,
{
    room_repo: Arc<R>,
    feed: ChangeFeed,
}

impl<R> RoomService<R>
where
    R: RoomRepository + Send + Sync,
{
    pub fn with_dependencies(room_repo: Arc<R>, feed: ChangeFeed) -> Self {
        RoomService { room_repo, feed }
    }

    /// Rooms visible to the participant with per-room unread counts and
    /// the aggregate badge total.
    pub async fn list_rooms(
        &self,
        participant_id: Uuid,
        role: ParticipantRole,
    ) -> Result<RoomListResponse, error::SystemError> {
        let raws = self
            .room_repo
            .list_for_participant(&participant_id, &role, self.room_repo.get_pool())
            .await?;

        let rooms: Vec<RoomView> = raws.into_iter().map(RoomView::from).collect();
        let total_unread = rooms.iter().map(|r| r.unread_count).sum();

        Ok(RoomListResponse { rooms, total_unread })
    }

    /// Create a room, or return the existing one for the same
    /// (type, order/booking) context. Returns `(room, created)`.
    pub async fn create_room(
        &self,
        body: NewRoom,
    ) -> Result<(RoomEntity, bool), error::SystemError> {
        body.validate_context()?;

        let pool = self.room_repo.get_pool();

        if body.is_context_bound() {
            if let Some(existing) = self.room_repo.find_by_context(&body, pool).await? {
                return Ok((existing, false));
            }
        }

        let room = match self.room_repo.create(&body, pool).await {
            Ok(room) => room,
            // Lost a create race on the context unique index: the winner's
            // room is the answer, same as the pre-check path.
            Err(e) if e.is_conflict() && body.is_context_bound() => {
                return match self.room_repo.find_by_context(&body, pool).await? {
                    Some(room) => {
                        tracing::debug!("Room create raced, returning winner {}", room.id);
                        Ok((room, false))
                    }
                    None => Err(e),
                };
            }
            Err(e) => return Err(e),
        };

        // best-effort: the room exists regardless of feed delivery
        match serde_json::to_value(&room) {
            Ok(row) => self.feed.publish(RowEvent::insert(Table::ChatRooms, row)),
            Err(e) => tracing::warn!("Failed to serialize room change event: {}", e),
        }

        tracing::info!("Room {} created (type {:?})", room.id, room._type);
        Ok((room, true))
    }
}
