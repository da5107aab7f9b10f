/// Realtime Bridge Server Actor
///
/// The server actor owns every live session and the watch registry, and
/// routes change-feed events to the sessions whose watches cover them:
/// room changes to list watchers that may see the room, new messages to
/// sessions with that room open, notifications to every session of the
/// target user. Routing is fan-out only; persistence already happened
/// before the event reached the feed.
use actix::prelude::*;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::modules::message::model::ReadReceipt;
use crate::modules::message::schema::MessageEntity;
use crate::modules::notification::schema::NotificationEntity;
use crate::modules::room::schema::RoomEntity;

use super::events::*;
use super::feed::{ChangeFeed, RowEvent, RowOp, Table};
use super::message::ServerMessage;
use super::registry::WatchRegistry;
use super::session::RealtimeSession;

/// Resubscribe backoff bounds for the feed listener task.
const LISTENER_BACKOFF_INITIAL: Duration = Duration::from_millis(500);
const LISTENER_BACKOFF_MAX: Duration = Duration::from_secs(30);

pub struct RealtimeServer {
    /// Map: session_id -> session actor address
    sessions: HashMap<Uuid, Addr<RealtimeSession>>,

    /// Who watches what
    registry: WatchRegistry,
}

impl RealtimeServer {
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), registry: WatchRegistry::new() }
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(message);
        }
    }

    fn send_to_sessions(&self, session_ids: &[Uuid], message: &ServerMessage) {
        for session_id in session_ids {
            self.send_to_session(session_id, message.clone());
        }
    }

    fn route_feed_event(&self, event: &RowEvent) {
        match (event.table, event.op) {
            // room created or its last-message cache moved: list watchers
            // that may see the room get the fresh row
            (Table::ChatRooms, RowOp::Insert | RowOp::Update) => {
                let Some(room) = parse_row::<RoomEntity>(event) else { return };
                let targets = self.registry.list_sessions_for(&room);
                tracing::debug!("Room {} changed, routed to {} sessions", room.id, targets.len());
                self.send_to_sessions(&targets, &ServerMessage::RoomChanged { room });
            }

            // new message: sessions with the room open
            (Table::ChatMessages, RowOp::Insert) => {
                let Some(message) = parse_row::<MessageEntity>(event) else { return };
                let targets = self.registry.room_sessions(&message.room_id);
                tracing::debug!(
                    "Message {} in room {}, routed to {} sessions",
                    message.id,
                    message.room_id,
                    targets.len()
                );
                self.send_to_sessions(
                    &targets,
                    &ServerMessage::NewMessage { room_id: message.room_id, message },
                );
            }

            // a reader cleared the room: sessions with the room open plus
            // the reader's own list watchers, so unread badges drop on
            // every device at once
            (Table::ChatMessages, RowOp::Update) => {
                let Some(receipt) = parse_row::<ReadReceipt>(event) else { return };
                let mut targets = self.registry.room_sessions(&receipt.room_id);
                for session_id in self.registry.list_sessions_of(&receipt.reader_id) {
                    if !targets.contains(&session_id) {
                        targets.push(session_id);
                    }
                }
                self.send_to_sessions(
                    &targets,
                    &ServerMessage::MessagesRead {
                        room_id: receipt.room_id,
                        reader_id: receipt.reader_id,
                    },
                );
            }

            // notifications reach every identified session of the user,
            // no watch required
            (Table::Notifications, RowOp::Insert) => {
                let Some(notification) = parse_row::<NotificationEntity>(event) else { return };
                let targets = self.registry.sessions_of(&notification.user_id);
                self.send_to_sessions(&targets, &ServerMessage::Notification { notification });
            }

            _ => {}
        }
    }
}

/// Row payloads come from our own write paths, but the intake endpoint
/// also feeds this stream, so a bad shape is logged and skipped.
fn parse_row<T: serde::de::DeserializeOwned>(event: &RowEvent) -> Option<T> {
    match serde_json::from_value(event.row.clone()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Unparseable {:?} {:?} event: {}", event.table, event.op, e);
            None
        }
    }
}

impl Actor for RealtimeServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Realtime bridge server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Realtime bridge server stopped");
    }
}

impl Handler<Connect> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("Realtime session connected: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("Realtime session disconnected: {}", msg.id);
        self.sessions.remove(&msg.id);
        self.registry.remove_session(&msg.id);
    }
}

impl Handler<Identify> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, msg: Identify, _: &mut Context<Self>) {
        tracing::info!(
            "Session {} identified as {} ({:?})",
            msg.session_id,
            msg.watcher.participant_id,
            msg.watcher.role
        );
        self.registry.identify(msg.session_id, msg.watcher);
    }
}

impl Handler<WatchRooms> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, msg: WatchRooms, _: &mut Context<Self>) {
        if !self.registry.watch_rooms(msg.session_id) {
            tracing::warn!("Session {} tried to watch rooms before hello", msg.session_id);
        }
    }
}

impl Handler<UnwatchRooms> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, msg: UnwatchRooms, _: &mut Context<Self>) {
        self.registry.unwatch_rooms(&msg.session_id);
    }
}

impl Handler<WatchRoom> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, msg: WatchRoom, _: &mut Context<Self>) {
        if !self.registry.watch_room(msg.session_id, msg.room_id) {
            tracing::warn!("Session {} tried to watch a room before hello", msg.session_id);
        }
    }
}

impl Handler<UnwatchRoom> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, msg: UnwatchRoom, _: &mut Context<Self>) {
        self.registry.unwatch_room(&msg.session_id, &msg.room_id);
    }
}

impl Handler<FeedEvent> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, msg: FeedEvent, _: &mut Context<Self>) {
        self.route_feed_event(&msg.0);
    }
}

/// A gap in the feed means clients may have missed anything; tell every
/// connected session to refetch its snapshots.
impl Handler<FeedLagged> for RealtimeServer {
    type Result = ();

    fn handle(&mut self, _: FeedLagged, _: &mut Context<Self>) {
        tracing::warn!("Change feed gap, resync sent to {} sessions", self.sessions.len());
        for session_addr in self.sessions.values() {
            session_addr.do_send(ServerMessage::Resync);
        }
    }
}

/// Make ServerMessage sendable to session actors
impl Message for ServerMessage {
    type Result = ();
}

impl Default for RealtimeServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pump change-feed events into the server actor. On a lag gap the
/// server broadcasts a resync; on a closed feed the task resubscribes
/// with exponential backoff instead of dying quietly.
pub fn spawn_feed_listener(feed: ChangeFeed, server: Addr<RealtimeServer>) {
    actix_web::rt::spawn(async move {
        let mut rx = feed.subscribe();
        let mut backoff = LISTENER_BACKOFF_INITIAL;
        tracing::info!("Realtime bridge listening on change feed");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    backoff = LISTENER_BACKOFF_INITIAL;
                    server.do_send(FeedEvent(event));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Realtime bridge lagged, {} events skipped", skipped);
                    server.do_send(FeedLagged);
                }
                Err(RecvError::Closed) => {
                    tracing::warn!(
                        "Change feed closed, resubscribing in {:?}",
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(LISTENER_BACKOFF_MAX);
                    rx = feed.subscribe();
                    // anything published during the gap is gone
                    server.do_send(FeedLagged);
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::realtime::message::ClientMessage;
    use crate::modules::room::schema::ParticipantRole;
    use tokio::sync::mpsc;

    #[derive(Message)]
    #[rtype(result = "usize")]
    struct GetSessionCount;

    impl Handler<GetSessionCount> for RealtimeServer {
        type Result = usize;

        fn handle(&mut self, _: GetSessionCount, _: &mut Context<Self>) -> usize {
            self.sessions.len()
        }
    }

    #[derive(Message)]
    #[rtype(result = "usize")]
    struct GetWatchCount;

    impl Handler<GetWatchCount> for RealtimeServer {
        type Result = usize;

        fn handle(&mut self, _: GetWatchCount, _: &mut Context<Self>) -> usize {
            self.registry.open_watch_count()
        }
    }

    async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    #[actix_web::test]
    async fn test_transport_close_tears_down_session_and_watches() {
        let server = RealtimeServer::new().start();
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = RealtimeSession::new(server.clone(), tx).start();

        session
            .send(ClientMessage::Hello {
                participant_id: Uuid::now_v7(),
                role: ParticipantRole::Customer,
            })
            .await
            .unwrap();
        session.send(ClientMessage::WatchRooms).await.unwrap();
        session.send(ClientMessage::WatchRoom { room_id: Uuid::now_v7() }).await.unwrap();
        settle().await;

        assert_eq!(server.send(GetSessionCount).await.unwrap(), 1);
        assert_eq!(server.send(GetWatchCount).await.unwrap(), 2);

        // the pump sends Shutdown when the socket goes away
        session.send(Shutdown).await.unwrap();
        settle().await;

        assert_eq!(server.send(GetSessionCount).await.unwrap(), 0);
        assert_eq!(server.send(GetWatchCount).await.unwrap(), 0);
    }
}
