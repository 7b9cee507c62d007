//! Persistence layer: the append-only JSONL event log.
//!
//! Records are written once and never updated or deleted. There is no
//! replay on startup; the log is an audit trail.

pub mod event_log;
pub mod models;

pub use event_log::EventLog;
pub use models::{CommandContext, EMIT_EVENT_TYPE, EventRecord};
