use uuid::Uuid;

use crate::{
    api::error,
    modules::room::{
        model::{NewRoom, RoomUnreadRaw},
        schema::{ParticipantRole, RoomEntity},
    },
};

#[async_trait::async_trait]
pub trait RoomRepository {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres>;

    async fn find_by_id<'e, E>(
        &self,
        room_id: &Uuid,
        tx: E,
    ) -> Result<Option<RoomEntity>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    /// Lookup by the idempotency context of order/booking rooms.
    async fn find_by_context<'e, E>(
        &self,
        room: &NewRoom,
        tx: E,
    ) -> Result<Option<RoomEntity>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    async fn create<'e, E>(&self, room: &NewRoom, tx: E) -> Result<RoomEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    /// Rooms visible to the participant, annotated with the viewer-relative
    /// unread count, most recent activity first.
    async fn list_for_participant<'e, E>(
        &self,
        participant_id: &Uuid,
        role: &ParticipantRole,
        tx: E,
    ) -> Result<Vec<RoomUnreadRaw>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    /// Refresh the denormalized last-message cache. Only the message-send
    /// transaction may call this.
    async fn set_last_message<'e, E>(
        &self,
        room_id: &Uuid,
        message: &str,
        sender_name: &str,
        at: &chrono::DateTime<chrono::Utc>,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;
}
