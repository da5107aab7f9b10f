use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{model::InsertMessage, schema::MessageEntity},
};

#[async_trait::async_trait]
pub trait MessageRepository {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres>;

    async fn create<'e, E>(
        &self,
        message: &InsertMessage,
        tx: E,
    ) -> Result<MessageEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    /// Full room history, oldest first.
    async fn list_by_room<'e, E>(
        &self,
        room_id: &Uuid,
        tx: E,
    ) -> Result<Vec<MessageEntity>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    /// Set-based read receipt: flips every unread message in the room not
    /// sent by the reader. Returns the number of rows changed, so calling
    /// it again is a no-op.
    async fn mark_room_read<'e, E>(
        &self,
        room_id: &Uuid,
        reader_id: &Uuid,
        tx: E,
    ) -> Result<u64, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    /// Viewer-relative unread count for one room.
    async fn count_unread<'e, E>(
        &self,
        room_id: &Uuid,
        viewer_id: &Uuid,
        tx: E,
    ) -> Result<i64, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;
}
