/// Realtime Session Actor
///
/// One actor per WebSocket connection. The session tracks its declared
/// identity, forwards watch requests to the server actor, and pushes
/// serialized ServerMessages to the client through the mpsc channel
/// bridged in handler.rs. Messages are deduplicated per session: a chat
/// message that reaches the session twice is delivered once.
use actix::prelude::*;
use std::collections::{HashSet, VecDeque};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::registry::Watcher;
use super::server::RealtimeServer;

/// Upper bound on remembered message ids per session. Duplicate routes
/// land within moments of each other, so a window this size is plenty;
/// oldest entries are evicted first.
const DELIVERY_LOG_CAPACITY: usize = 1024;

/// Chat message ids already delivered on this session.
#[derive(Default)]
pub struct DeliveryLog {
    seen: HashSet<Uuid>,
    order: VecDeque<Uuid>,
}

impl DeliveryLog {
    /// True exactly once per id within the retention window.
    pub fn first_delivery(&mut self, message_id: Uuid) -> bool {
        if !self.seen.insert(message_id) {
            return false;
        }
        self.order.push_back(message_id);
        if self.order.len() > DELIVERY_LOG_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }
}

pub struct RealtimeSession {
    /// Unique session ID
    pub id: Uuid,

    /// Declared identity (None until hello)
    pub identity: Option<Watcher>,

    /// Bridge server actor address
    pub server: Addr<RealtimeServer>,

    /// Channel carrying JSON to the client (bridged in handler.rs)
    pub tx: mpsc::UnboundedSender<String>,

    /// Per-session dedupe of delivered chat messages
    delivery: DeliveryLog,
}

impl RealtimeSession {
    pub fn new(server: Addr<RealtimeServer>, tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            identity: None,
            server,
            tx,
            delivery: DeliveryLog::default(),
        }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!("Cannot reach client (session {}): {}", self.id, e);
                }
            }
            Err(e) => {
                tracing::error!("Cannot serialize ServerMessage (session {}): {}", self.id, e);
            }
        }
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    /// Watch requests before hello are rejected, not queued.
    fn require_identity(&self) -> Option<&Watcher> {
        if self.identity.is_none() {
            self.send_error("Send hello before watching");
            tracing::warn!("Session {} sent a watch request before hello", self.id);
        }
        self.identity.as_ref()
    }

    fn handle_client_message(&mut self, msg: &ClientMessage) {
        match msg {
            ClientMessage::Hello { participant_id, role } => {
                let watcher = Watcher { participant_id: *participant_id, role: *role };
                self.identity = Some(watcher);
                self.server.do_send(Identify { session_id: self.id, watcher });
                self.send_to_client(&ServerMessage::HelloAck { participant_id: *participant_id });
            }

            ClientMessage::WatchRooms => {
                if self.require_identity().is_some() {
                    self.server.do_send(WatchRooms { session_id: self.id });
                }
            }

            ClientMessage::UnwatchRooms => {
                self.server.do_send(UnwatchRooms { session_id: self.id });
            }

            ClientMessage::WatchRoom { room_id } => {
                if self.require_identity().is_some() {
                    self.server.do_send(WatchRoom { session_id: self.id, room_id: *room_id });
                }
            }

            ClientMessage::UnwatchRoom { room_id } => {
                self.server.do_send(UnwatchRoom { session_id: self.id, room_id: *room_id });
            }

            ClientMessage::Ping => {
                self.send_to_client(&ServerMessage::Pong);
            }
        }
    }
}

impl Actor for RealtimeSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("Realtime session started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("Realtime session stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

/// Make ClientMessage sendable from handler.rs
impl Message for ClientMessage {
    type Result = ();
}

impl Handler<ClientMessage> for RealtimeSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, _ctx: &mut Context<Self>) {
        self.handle_client_message(&msg);
    }
}

/// Transport closed. Stopping here drives `stopped()`, which sends
/// `Disconnect` so the server forgets the session and its watches.
impl Handler<Shutdown> for RealtimeSession {
    type Result = ();

    fn handle(&mut self, _: Shutdown, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}

/// Deliveries from the server actor. A session watching both the room
/// list and the open room can receive the same chat message through two
/// routes; the delivery log collapses those to one frame.
impl Handler<ServerMessage> for RealtimeSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        if let ServerMessage::NewMessage { message, .. } = &msg {
            if !self.delivery.first_delivery(message.id) {
                tracing::debug!(
                    "Duplicate delivery of message {} suppressed on session {}",
                    message.id,
                    self.id
                );
                return;
            }
        }
        self.send_to_client(&msg);
    }
}
