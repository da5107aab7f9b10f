use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{
        model::InsertMessage, repository::MessageRepository, schema::MessageEntity,
    },
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    async fn create<'e, E>(
        &self,
        message: &InsertMessage,
        tx: E,
    ) -> Result<MessageEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let id = Uuid::now_v7();
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO chat_messages
                (id, room_id, sender_type, sender_id, sender_name, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(message.room_id)
        .bind(message.sender_type)
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.message)
        .fetch_one(tx)
        .await?;

        Ok(message)
    }

    async fn list_by_room<'e, E>(
        &self,
        room_id: &Uuid,
        tx: E,
    ) -> Result<Vec<MessageEntity>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        // has index on (room_id, created_at, id)
        let messages = sqlx::query_as::<_, MessageEntity>(
            "SELECT * FROM chat_messages WHERE room_id = $1 ORDER BY created_at, id",
        )
        .bind(room_id)
        .fetch_all(tx)
        .await?;

        Ok(messages)
    }

    async fn mark_room_read<'e, E>(
        &self,
        room_id: &Uuid,
        reader_id: &Uuid,
        tx: E,
    ) -> Result<u64, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE chat_messages
            SET is_read = TRUE
            WHERE room_id = $1
            AND sender_id <> $2
            AND is_read = FALSE
            "#,
        )
        .bind(room_id)
        .bind(reader_id)
        .execute(tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread<'e, E>(
        &self,
        room_id: &Uuid,
        viewer_id: &Uuid,
        tx: E,
    ) -> Result<i64, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM chat_messages
            WHERE room_id = $1
            AND sender_id <> $2
            AND is_read = FALSE
            "#,
        )
        .bind(room_id)
        .bind(viewer_id)
        .fetch_one(tx)
        .await?;

        Ok(count.0)
    }
}
