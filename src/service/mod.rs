//! Service layer: command transaction orchestration.
//!
//! [`RelayService`] parses inbound frames, runs the command interpreter,
//! and drives the [`super::domain::ConnectionRegistry`] and
//! [`super::persistence::EventLog`] accordingly.

pub mod relay_service;

pub use relay_service::{FrameOutcome, RelayService};
