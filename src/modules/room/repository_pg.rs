use uuid::Uuid;

use crate::api::error;
use crate::modules::room::model::{NewRoom, RoomUnreadRaw};
use crate::modules::room::repository::RoomRepository;
use crate::modules::room::schema::{ParticipantRole, RoomEntity};

#[derive(Clone)]
pub struct RoomRepositoryPg {
    pool: sqlx::PgPool,
}

impl RoomRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RoomRepository for RoomRepositoryPg {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    async fn find_by_id<'e, E>(
        &self,
        room_id: &Uuid,
        tx: E,
    ) -> Result<Option<RoomEntity>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let room = sqlx::query_as::<_, RoomEntity>("SELECT * FROM chat_rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(tx)
            .await?;

        Ok(room)
    }

    async fn find_by_context<'e, E>(
        &self,
        room: &NewRoom,
        tx: E,
    ) -> Result<Option<RoomEntity>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let existing = sqlx::query_as::<_, RoomEntity>(
            r#"
            SELECT * FROM chat_rooms
            WHERE type = $1
            AND customer_id = $2
            AND (order_id = $3 OR booking_id = $4)
            LIMIT 1
            "#,
        )
        .bind(room._type)
        .bind(room.customer_id)
        .bind(room.order_id)
        .bind(room.booking_id)
        .fetch_optional(tx)
        .await?;

        Ok(existing)
    }

    async fn create<'e, E>(&self, room: &NewRoom, tx: E) -> Result<RoomEntity, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let id = Uuid::now_v7();
        let entity = sqlx::query_as::<_, RoomEntity>(
            r#"
            INSERT INTO chat_rooms
                (id, type, customer_id, teknisi_id, admin_id, order_id, booking_id, name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(room._type)
        .bind(room.customer_id)
        .bind(room.teknisi_id)
        .bind(room.admin_id)
        .bind(room.order_id)
        .bind(room.booking_id)
        .bind(&room.name)
        .fetch_one(tx)
        .await?;

        Ok(entity)
    }

    async fn list_for_participant<'e, E>(
        &self,
        participant_id: &Uuid,
        role: &ParticipantRole,
        tx: E,
    ) -> Result<Vec<RoomUnreadRaw>, error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        // Unread counts are derived per viewer at read time, not stored:
        // two participants of the same room hold different counts at once.
        let visibility = match role {
            ParticipantRole::Customer => "r.customer_id = $1",
            ParticipantRole::Teknisi => "r.teknisi_id = $1",
            ParticipantRole::Admin => {
                "(r.admin_id = $1 OR (r.type = 'support' AND r.admin_id IS NULL))"
            }
        };

        // Rooms without messages sort below any room that has one.
        let query = format!(
            r#"
            SELECT
                r.*,
                (
                    SELECT COUNT(*)
                    FROM chat_messages m
                    WHERE m.room_id = r.id
                    AND m.sender_id <> $1
                    AND m.is_read = FALSE
                ) AS unread_count
            FROM chat_rooms r
            WHERE {visibility}
            ORDER BY r.last_message_at DESC NULLS LAST, r.created_at DESC
            "#
        );

        let rooms = sqlx::query_as::<_, RoomUnreadRaw>(&query)
            .bind(participant_id)
            .fetch_all(tx)
            .await?;

        Ok(rooms)
    }

    async fn set_last_message<'e, E>(
        &self,
        room_id: &Uuid,
        message: &str,
        sender_name: &str,
        at: &chrono::DateTime<chrono::Utc>,
        tx: E,
    ) -> Result<(), error::SystemError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE chat_rooms
            SET last_message = $2,
                last_message_at = $3,
                last_sender_name = $4
            WHERE id = $1
            "#,
        )
        .bind(room_id)
        .bind(message)
        .bind(at)
        .bind(sender_name)
        .execute(tx)
        .await?;

        Ok(())
    }
}
