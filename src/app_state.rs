//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::ConnectionRegistry;
use crate::persistence::EventLog;
use crate::service::RelayService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay service for all command handling.
    pub relay: Arc<RelayService>,
}

impl AppState {
    /// Builds the registry, event log, and relay service described by
    /// `config`.
    #[must_use]
    pub fn from_config(config: &RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let event_log =
            Arc::new(EventLog::new(&config.event_log_path).with_fsync(config.event_log_fsync));
        let relay = Arc::new(RelayService::new(
            registry,
            event_log,
            config.server_id.clone(),
        ));
        Self { relay }
    }
}
