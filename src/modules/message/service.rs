/// Message Channel Service
///
/// Business logic for the per-room message log:
/// - validated sends with transactional last-message denormalization
/// - oldest-first history with timestamp grouping flags
/// - set-based read receipts
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::api::error;
use crate::modules::message::model::{
    chronological, flag_timestamps, InsertMessage, MessageListResponse, ReadReceipt, SendMessage,
};
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::MessageEntity;
use crate::modules::realtime::feed::{ChangeFeed, RowEvent, RowOp, Table};
use crate::modules::room::repository::RoomRepository;

#[derive(Clone)]
pub struct MessageService<M, R>
where
    M: MessageRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
{
    message_repo: Arc<M>,
    room_repo: Arc<R>,
    feed: ChangeFeed,
}

impl<M, R> MessageService<M, R>
where
    M: MessageRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
{
    pub fn with_dependencies(message_repo: Arc<M>, room_repo: Arc<R>, feed: ChangeFeed) -> Self {
        MessageService { message_repo, room_repo, feed }
    }

    /// Append a message to a room.
    ///
    /// Flow:
    /// 1. Reject blank text before any persistence attempt
    /// 2. Insert the message and refresh the room's last-message cache in
    ///    one transaction (no visible intermediate state)
    /// 3. Publish the insert and the room update to the change feed
    pub async fn send(
        &self,
        room_id: Uuid,
        body: SendMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        if body.is_blank() {
            return Err(error::SystemError::bad_request("Message text must not be empty"));
        }
        body.validate()?;

        let mut tx = self.message_repo.get_pool().begin().await?;

        let room = self
            .room_repo
            .find_by_id(&room_id, tx.as_mut())
            .await?
            .ok_or_else(|| error::SystemError::not_found("Room not found"))?;

        let message = self
            .message_repo
            .create(
                &InsertMessage {
                    room_id,
                    sender_type: body.sender_type,
                    sender_id: body.sender_id,
                    sender_name: body.sender_name,
                    message: body.message,
                },
                tx.as_mut(),
            )
            .await?;

        self.room_repo
            .set_last_message(
                &room_id,
                &message.message,
                &message.sender_name,
                &message.created_at,
                tx.as_mut(),
            )
            .await?;

        tx.commit().await?;

        self.publish(Table::ChatMessages, RowOp::Insert, serde_json::to_value(&message));

        let mut updated = room;
        updated.last_message = Some(message.message.clone());
        updated.last_message_at = Some(message.created_at);
        updated.last_sender_name = Some(message.sender_name.clone());
        self.publish(Table::ChatRooms, RowOp::Update, serde_json::to_value(&updated));

        tracing::info!("Message {} appended to room {}", message.id, room_id);
        Ok(message)
    }

    /// Room history, oldest first, with timestamp grouping flags. Rows are
    /// re-sorted by the (created_at, id) contract rather than trusted as
    /// delivered.
    pub async fn list(&self, room_id: Uuid) -> Result<MessageListResponse, error::SystemError> {
        let pool = self.message_repo.get_pool();

        self.room_repo
            .find_by_id(&room_id, pool)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Room not found"))?;

        let mut messages = self.message_repo.list_by_room(&room_id, pool).await?;
        messages.sort_by(chronological);

        Ok(MessageListResponse { messages: flag_timestamps(messages) })
    }

    /// Mark every not-own message in the room as read. One set operation,
    /// idempotent: a second call (or a concurrent one from another device)
    /// changes nothing.
    pub async fn mark_as_read(
        &self,
        room_id: Uuid,
        reader_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let pool = self.message_repo.get_pool();

        self.room_repo
            .find_by_id(&room_id, pool)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Room not found"))?;

        let affected = self.message_repo.mark_room_read(&room_id, &reader_id, pool).await?;

        if affected > 0 {
            let receipt = ReadReceipt { room_id, reader_id };
            self.publish(Table::ChatMessages, RowOp::Update, serde_json::to_value(&receipt));
            tracing::debug!("Marked {} messages read in room {}", affected, room_id);
        }

        Ok(())
    }

    /// Feed publication is best-effort: the write it describes has already
    /// committed, so a serialization failure is logged, not surfaced.
    fn publish(
        &self,
        table: Table,
        op: RowOp,
        row: Result<serde_json::Value, serde_json::Error>,
    ) {
        match row {
            Ok(row) => self.feed.publish(RowEvent { op, table, row }),
            Err(e) => tracing::warn!("Failed to serialize change event row: {}", e),
        }
    }
}
