use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::notification::model::{InsertNotification, NotificationListResponse};
use crate::modules::notification::repository::NotificationRepository;
use crate::modules::notification::schema::NotificationEntity;
use crate::modules::realtime::feed::{ChangeFeed, RowEvent, Table};

#[derive(Clone)]
pub struct NotificationService<N>
where
    N: NotificationRepository + Send + Sync,
{
    notification_repo: Arc<N>,
    feed: ChangeFeed,
}

impl<N> NotificationService<N>
where
    N: NotificationRepository + Send + Sync,
{
    pub fn with_dependencies(notification_repo: Arc<N>, feed: ChangeFeed) -> Self {
        NotificationService { notification_repo, feed }
    }

    /// Persist a notification and announce it on the change feed so open
    /// sessions get their bell badge bumped live.
    pub async fn create(
        &self,
        notification: InsertNotification,
    ) -> Result<NotificationEntity, error::SystemError> {
        let entity = self
            .notification_repo
            .create(&notification, self.notification_repo.get_pool())
            .await?;

        match serde_json::to_value(&entity) {
            Ok(row) => self.feed.publish(RowEvent::insert(Table::Notifications, row)),
            Err(e) => tracing::warn!("Failed to serialize notification event: {}", e),
        }

        Ok(entity)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<NotificationListResponse, error::SystemError> {
        let pool = self.notification_repo.get_pool();

        let notifications = self.notification_repo.list_for_user(&user_id, limit, pool).await?;
        let unread_count = self.notification_repo.count_unread(&user_id, pool).await?;

        Ok(NotificationListResponse { notifications, unread_count })
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<(), error::SystemError> {
        let found =
            self.notification_repo.mark_read(&id, self.notification_repo.get_pool()).await?;

        if !found {
            return Err(error::SystemError::not_found("Notification not found"));
        }

        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, error::SystemError> {
        let affected = self
            .notification_repo
            .mark_all_read(&user_id, self.notification_repo.get_pool())
            .await?;

        tracing::debug!("Marked {} notifications read for user {}", affected, user_id);
        Ok(affected)
    }
}
