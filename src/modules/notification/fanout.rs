/// Notification Fan-out
///
/// A change-feed consumer that turns domain events into per-user
/// notification rows: new chat messages, order status transitions,
/// booking progress, CRM targets flipping to achieved. Delivery is
/// best-effort by contract: a failure here is logged and swallowed, the
/// triggering event has already succeeded.
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::modules::message::schema::MessageEntity;
use crate::modules::notification::model::{
    notification_for_domain_event, notification_for_message,
};
use crate::modules::notification::repository::NotificationRepository;
use crate::modules::notification::service::NotificationService;
use crate::modules::realtime::feed::{ChangeFeed, RowEvent, RowOp, Table};
use crate::modules::room::repository::RoomRepository;

pub fn spawn_fanout<N, R>(feed: ChangeFeed, service: NotificationService<N>, room_repo: Arc<R>)
where
    N: NotificationRepository + Send + Sync + 'static,
    R: RoomRepository + Send + Sync + 'static,
{
    actix_web::rt::spawn(async move {
        run(feed, service, room_repo).await;
    });
}

async fn run<N, R>(feed: ChangeFeed, service: NotificationService<N>, room_repo: Arc<R>)
where
    N: NotificationRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
{
    let mut rx = feed.subscribe();
    tracing::info!("Notification fan-out listening on change feed");

    loop {
        match rx.recv().await {
            Ok(event) => handle_event(&event, &service, room_repo.as_ref()).await,
            Err(RecvError::Lagged(skipped)) => {
                // notifications for the skipped events are lost, not retried
                tracing::warn!("Notification fan-out lagged, {} events skipped", skipped);
            }
            Err(RecvError::Closed) => {
                tracing::info!("Change feed closed, notification fan-out stopping");
                break;
            }
        }
    }
}

async fn handle_event<N, R>(event: &RowEvent, service: &NotificationService<N>, room_repo: &R)
where
    N: NotificationRepository + Send + Sync,
    R: RoomRepository + Send + Sync,
{
    match event.table {
        Table::ChatMessages if event.op == RowOp::Insert => {
            let message = match serde_json::from_value::<MessageEntity>(event.row.clone()) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Unparseable chat message event: {}", e);
                    return;
                }
            };

            let room = match room_repo.find_by_id(&message.room_id, room_repo.get_pool()).await {
                Ok(Some(room)) => room,
                Ok(None) => {
                    tracing::warn!("Message event for unknown room {}", message.room_id);
                    return;
                }
                Err(e) => {
                    tracing::warn!("Room lookup failed during fan-out: {}", e);
                    return;
                }
            };

            // every participant except the sender gets one, whether or not
            // they are currently viewing the room
            for recipient in room.recipients_of(&message.sender_id) {
                if let Err(e) = service.create(notification_for_message(&message, recipient)).await
                {
                    tracing::warn!("Notification delivery failed for {}: {}", recipient, e);
                }
            }
        }

        Table::Orders | Table::Bookings | Table::Targets => {
            if let Some(notification) = notification_for_domain_event(event) {
                let user_id = notification.user_id;
                if let Err(e) = service.create(notification).await {
                    tracing::warn!("Notification delivery failed for {}: {}", user_id, e);
                }
            }
        }

        _ => {}
    }
}
