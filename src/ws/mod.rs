//! WebSocket layer: upgrade handling, connection lifecycle, frame parsing.
//!
//! Clients connect on `/` or `/ws` and exchange JSON text frames with the
//! relay.

pub mod connection;
pub mod handler;
pub mod messages;
