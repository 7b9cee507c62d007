//! Connection handles.

use std::fmt;

use uuid::Uuid;

/// Opaque handle for one live WebSocket connection.
///
/// Minted on upgrade and used as the [`super::ConnectionRegistry`] key and
/// as the `connection` field in diagnostics. Never sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Mints a fresh random handle.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
