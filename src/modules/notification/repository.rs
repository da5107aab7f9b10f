use uuid::Uuid;

use crate::{
    api::error,
    modules::notification::{model::InsertNotification, schema::NotificationEntity},
};

#[async_trait::async_trait]
pub trait NotificationRepository {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres>;

    async fn create<'e, E>(
        &self,
        notification: &InsertNotification,
        tx: E,
    ) -> Result<NotificationEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    /// Newest first; `limit` bounds the recent window.
    async fn list_for_user<'e, E>(
        &self,
        user_id: &Uuid,
        limit: Option<i64>,
        tx: E,
    ) -> Result<Vec<NotificationEntity>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    async fn count_unread<'e, E>(
        &self,
        user_id: &Uuid,
        tx: E,
    ) -> Result<i64, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    /// Returns false when the id does not exist. Setting an already-read
    /// row read again is a no-op, not an error.
    async fn mark_read<'e, E>(&self, id: &Uuid, tx: E) -> Result<bool, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;

    async fn mark_all_read<'e, E>(&self, user_id: &Uuid, tx: E) -> Result<u64, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>;
}
