use uuid::Uuid;

use crate::{
    api::error,
    modules::notification::{
        model::InsertNotification, repository::NotificationRepository, schema::NotificationEntity,
    },
};

#[derive(Clone)]
pub struct NotificationRepositoryPg {
    pool: sqlx::PgPool,
}

impl NotificationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationRepository for NotificationRepositoryPg {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    async fn create<'e, E>(
        &self,
        notification: &InsertNotification,
        tx: E,
    ) -> Result<NotificationEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let id = Uuid::now_v7();
        let entity = sqlx::query_as::<_, NotificationEntity>(
            r#"
            INSERT INTO notifications (id, user_id, type, title, message, related_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(notification.user_id)
        .bind(notification._type)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.related_id)
        .fetch_one(tx)
        .await?;

        Ok(entity)
    }

    async fn list_for_user<'e, E>(
        &self,
        user_id: &Uuid,
        limit: Option<i64>,
        tx: E,
    ) -> Result<Vec<NotificationEntity>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        // has index on (user_id, created_at DESC)
        let notifications = if let Some(limit) = limit {
            sqlx::query_as::<_, NotificationEntity>(
                "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(tx)
            .await?
        } else {
            sqlx::query_as::<_, NotificationEntity>(
                "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(tx)
            .await?
        };

        Ok(notifications)
    }

    async fn count_unread<'e, E>(
        &self,
        user_id: &Uuid,
        tx: E,
    ) -> Result<i64, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(tx)
        .await?;

        Ok(count.0)
    }

    async fn mark_read<'e, E>(&self, id: &Uuid, tx: E) -> Result<bool, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read<'e, E>(&self, user_id: &Uuid, tx: E) -> Result<u64, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(tx)
        .await?;

        Ok(result.rows_affected())
    }
}
