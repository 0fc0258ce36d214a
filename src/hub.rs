//! Outbound channel directory for live `WebSocket` connections.
//!
//! Maps each connection id to the sender half of the channel drained by that
//! socket's writer task. Holds no matching state: the coordinator decides who
//! is told what, the hub only routes the frames.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::ServerEvent;

/// Server-assigned identity of one live client.
pub type ConnectionId = Uuid;

/// A message destined for a specific `WebSocket` client.
pub type WsTx = mpsc::UnboundedSender<String>;

#[derive(Debug, Clone, Default)]
pub struct ConnectionHub {
    senders: Arc<DashMap<ConnectionId, WsTx>>,
}

impl ConnectionHub {
    #[must_use]
    pub fn new() -> Self {
        Self {
            senders: Arc::new(DashMap::new()),
        }
    }

    pub fn insert(&self, id: ConnectionId, tx: WsTx) {
        self.senders.insert(id, tx);
    }

    pub fn remove(&self, id: ConnectionId) {
        self.senders.remove(&id);
    }

    /// Queue an event for one connection. Never waits; a closed channel is
    /// left for the reaper to notice.
    pub fn send(&self, id: ConnectionId, event: &ServerEvent) {
        let Some(tx) = self.senders.get(&id) else {
            tracing::debug!(connection_id = %id, "dropping event for unknown connection");
            return;
        };

        match serde_json::to_string(event) {
            Ok(frame) => {
                if tx.send(frame).is_err() {
                    tracing::debug!(connection_id = %id, "outbound channel closed");
                }
            }
            Err(e) => tracing::error!(connection_id = %id, "failed to encode event: {e}"),
        }
    }

    /// A connection is live while its writer task still holds the receiver.
    #[must_use]
    pub fn is_live(&self, id: ConnectionId) -> bool {
        self.senders.get(&id).is_some_and(|tx| !tx.is_closed())
    }

}
