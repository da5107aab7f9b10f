/// Realtime Actor Events
///
/// Messages exchanged between the session actors and the bridge server
/// actor, plus the feed-side events injected by the listener task.
use actix::prelude::*;
use uuid::Uuid;

use super::feed::RowEvent;
use super::registry::Watcher;
use super::session::RealtimeSession;

/// Event: a client connected to the bridge
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    /// Unique session ID
    pub id: Uuid,
    /// Session actor address for delivery
    pub addr: Addr<RealtimeSession>,
}

/// Event: a client disconnected from the bridge
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    /// Session ID to tear down
    pub id: Uuid,
}

/// Event: the session declared its identity
#[derive(Message)]
#[rtype(result = "()")]
pub struct Identify {
    pub session_id: Uuid,
    pub watcher: Watcher,
}

/// Event: the session wants room-list delivery
#[derive(Message)]
#[rtype(result = "()")]
pub struct WatchRooms {
    pub session_id: Uuid,
}

/// Event: the session stops room-list delivery
#[derive(Message)]
#[rtype(result = "()")]
pub struct UnwatchRooms {
    pub session_id: Uuid,
}

/// Event: the session opened a room
#[derive(Message)]
#[rtype(result = "()")]
pub struct WatchRoom {
    pub session_id: Uuid,
    pub room_id: Uuid,
}

/// Event: the session closed a room
#[derive(Message)]
#[rtype(result = "()")]
pub struct UnwatchRoom {
    pub session_id: Uuid,
    pub room_id: Uuid,
}

/// Event: the transport closed. The session actor must stop so its
/// registrations are torn down on the server.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

/// Event: a row changed on the change feed
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct FeedEvent(pub RowEvent);

/// Event: the feed listener fell behind and events were skipped.
/// Every connected client must refetch its snapshots.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct FeedLagged;
