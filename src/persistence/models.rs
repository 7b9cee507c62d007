//! Event log record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record type written when a recognized command emits a domain event.
pub const EMIT_EVENT_TYPE: &str = "emit";

/// One line of the event log.
///
/// Immutable once written. `id` is a fresh UUID v4 per record and
/// `timestamp` serializes as RFC 3339 (ISO-8601) in UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Event type discriminator (e.g. `"emit"`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Wall-clock time the record was created.
    pub timestamp: DateTime<Utc>,
    /// Event-specific data.
    pub payload: serde_json::Value,
    /// Where the event came from.
    pub context: serde_json::Value,
}

/// Context attached to records emitted by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandContext {
    /// Identifier of the emitting server.
    pub source: String,
    /// Canonical command that caused the event.
    pub command: String,
}
