//! # genesis-relay
//!
//! Real-time WebSocket command relay. Clients send text commands; the
//! privileged `/deploy` command broadcasts a genesis notification to every
//! connected client and appends an immutable audit record to a local JSONL
//! event log. Anything else gets a direct "unknown command" reply.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)
//!     │
//!     ├── WS Handler (ws/)
//!     │
//!     ├── RelayService (service/)
//!     ├── Command interpreter (domain/)
//!     │
//!     ├── ConnectionRegistry (domain/)
//!     │
//!     └── JSONL EventLog (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
