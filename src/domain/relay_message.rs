//! Server → client frames.
//!
//! Every frame the relay sends is an [`OutboundMessage`], encoded as
//! `{ "type": ..., "payload": ... }`. Clients switch on `type`.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Fixed announcement broadcast ahead of every genesis event.
pub const GENESIS_ANNOUNCEMENT: &str = "Genesis Event initiated by Big Boss...";

/// Trigger name recorded in every [`GenesisPayload`].
pub const DEPLOY_TRIGGER: &str = "deploy_command";

/// Payload of a `GENESIS_EVENT` frame, also persisted as the event record
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisPayload {
    /// Unix epoch milliseconds at which the genesis was triggered.
    pub timestamp: i64,
    /// What triggered the genesis; always [`DEPLOY_TRIGGER`] today.
    pub trigger: String,
}

impl GenesisPayload {
    /// Builds a payload stamped with the current time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            trigger: DEPLOY_TRIGGER.to_string(),
        }
    }
}

/// Tagged union of every frame the relay can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OutboundMessage {
    /// Free-form text line for the client terminal.
    #[serde(rename = "SYSTEM_MESSAGE")]
    SystemMessage(String),
    /// Genesis notification, broadcast to every client on `/deploy`.
    #[serde(rename = "GENESIS_EVENT")]
    GenesisEvent(GenesisPayload),
}

impl OutboundMessage {
    /// Shorthand for a [`OutboundMessage::SystemMessage`].
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::SystemMessage(text.into())
    }

    /// Returns the wire `type` discriminator.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::SystemMessage(_) => "SYSTEM_MESSAGE",
            Self::GenesisEvent(_) => "GENESIS_EVENT",
        }
    }
}
