//! Registry of live client connections with best-effort fan-out.
//!
//! Each connection is represented by the sending half of its outbound
//! queue. A dedicated writer task per connection drains the queue into the
//! socket, so enqueueing here never waits on the network and one slow
//! client cannot hold up the others.

use std::collections::HashMap;

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{RwLock, mpsc};

use super::{ConnectionId, OutboundMessage};
use crate::error::RelayError;

/// Sending half of a connection's outbound frame queue.
pub type OutboundSender = mpsc::UnboundedSender<Utf8Bytes>;

/// Receiving half of a connection's outbound frame queue.
pub type OutboundReceiver = mpsc::UnboundedReceiver<Utf8Bytes>;

/// Set of currently registered connections.
///
/// # Lifecycle
///
/// - A connection is added with [`register`](Self::register) right after
///   the WebSocket upgrade.
/// - It is removed with [`unregister`](Self::unregister) when its socket
///   closes or errors. Removal is idempotent.
/// - A registered connection whose writer task has already gone away is
///   "not open": broadcasts skip it, but it stays registered until its own
///   close path unregisters it.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, OutboundSender>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection. Returns `false` and leaves the registry untouched
    /// if `id` is already registered.
    pub async fn register(&self, id: ConnectionId, outbound: OutboundSender) -> bool {
        let mut map = self.connections.write().await;
        if map.contains_key(&id) {
            return false;
        }
        map.insert(id, outbound);
        true
    }

    /// Removes a connection. Returns `false` if it was not registered;
    /// never fails.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        self.connections.write().await.remove(&id).is_some()
    }

    /// Serializes `message` once and enqueues it on every open connection.
    ///
    /// Connections whose queue is closed are skipped silently. A failed
    /// enqueue on one connection does not affect the others.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialization`] if `message` cannot be encoded,
    /// in which case nothing is sent.
    pub async fn broadcast(&self, message: &OutboundMessage) -> Result<(), RelayError> {
        let frame = encode(message)?;
        let map = self.connections.read().await;
        for (id, outbound) in map.iter() {
            if outbound.is_closed() {
                continue;
            }
            if outbound.send(frame.clone()).is_err() {
                tracing::debug!(connection = %id, "broadcast delivery failed");
            }
        }
        Ok(())
    }

    /// Enqueues `message` on a single connection.
    ///
    /// Unknown or closed connections are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Serialization`] if `message` cannot be encoded.
    pub async fn send_to(
        &self,
        id: ConnectionId,
        message: &OutboundMessage,
    ) -> Result<(), RelayError> {
        let frame = encode(message)?;
        let map = self.connections.read().await;
        match map.get(&id) {
            Some(outbound) if !outbound.is_closed() => {
                if outbound.send(frame).is_err() {
                    tracing::debug!(connection = %id, "direct delivery failed");
                }
            }
            _ => tracing::debug!(connection = %id, "direct send to closed or unknown connection"),
        }
        Ok(())
    }

    /// Returns `true` if `id` is currently registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

fn encode(message: &OutboundMessage) -> Result<Utf8Bytes, RelayError> {
    Ok(Utf8Bytes::from(serde_json::to_string(message)?))
}
