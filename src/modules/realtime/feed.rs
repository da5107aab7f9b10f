/// Generic change feed: a broadcast stream of row-level insert/update
/// events. Producers are the write paths of this service plus the
/// `POST /api/events` intake for sibling subsystems (orders, bookings,
/// CRM targets). Consumers are the realtime bridge listener and the
/// notification fan-out, each on its own subscription.
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default buffer before a slow consumer starts lagging.
pub const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowOp {
    Insert,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    ChatRooms,
    ChatMessages,
    Notifications,
    Orders,
    Bookings,
    Targets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowEvent {
    pub op: RowOp,
    pub table: Table,
    pub row: serde_json::Value,
}

impl RowEvent {
    pub fn insert(table: Table, row: serde_json::Value) -> Self {
        Self { op: RowOp::Insert, table, row }
    }

    pub fn update(table: Table, row: serde_json::Value) -> Self {
        Self { op: RowOp::Update, table, row }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<RowEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Best-effort publish. A feed with no live subscribers is not an
    /// error: the write that produced the event has already succeeded.
    pub fn publish(&self, event: RowEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("Change feed has no subscribers, event dropped: {:?}", e.0.table);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RowEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(FEED_CAPACITY)
    }
}
