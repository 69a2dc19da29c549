//! Outbound delivery map for connected peers.
//!
//! [`PeerMap`] maps each live [`ConnectionId`] to the unbounded mpsc
//! sender feeding that connection's write half. Each recipient has
//! exactly one queue, so delivery to a given recipient preserves the
//! sender's emission order. Send failures mean the peer's task is gone;
//! they are logged and swallowed so a dead peer never aborts delivery to
//! the rest of a room.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use crate::domain::ConnectionId;
use crate::ws::messages::ServerMessage;

/// Shared map of connection id → outbound message queue.
#[derive(Debug, Clone, Default)]
pub struct PeerMap {
    inner: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>>>,
}

impl PeerMap {
    /// Creates an empty peer map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbound queue. Called once at upgrade.
    pub async fn register(
        &self,
        connection_id: ConnectionId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) {
        self.inner.write().await.insert(connection_id, sender);
    }

    /// Removes a connection's outbound queue. Called once at close.
    pub async fn unregister(&self, connection_id: ConnectionId) {
        self.inner.write().await.remove(&connection_id);
    }

    /// Queues a message for one connection. Returns `false` when the
    /// connection is unknown or its task has already exited.
    pub async fn send(&self, connection_id: ConnectionId, message: ServerMessage) -> bool {
        let map = self.inner.read().await;
        match map.get(&connection_id) {
            Some(sender) => {
                if sender.send(message).is_err() {
                    tracing::warn!(%connection_id, "outbound queue closed, dropping message");
                    return false;
                }
                true
            }
            None => {
                tracing::debug!(%connection_id, "no outbound queue for connection");
                false
            }
        }
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns `true` if no connections are registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
