//! Relay service: routes inbound frames and runs command transactions.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::domain::command::DEPLOY_COMMAND;
use crate::domain::connection_registry::OutboundReceiver;
use crate::domain::relay_message::GENESIS_ANNOUNCEMENT;
use crate::domain::{
    Action, ConnectionId, ConnectionRegistry, GenesisPayload, OutboundMessage, interpret,
};
use crate::error::ProtocolError;
use crate::persistence::{CommandContext, EMIT_EVENT_TYPE, EventLog, EventRecord};
use crate::ws::messages::{InboundFrame, parse_frame};

/// What happened to one inbound frame.
#[derive(Debug)]
pub enum FrameOutcome {
    /// The frame was not a dispatchable command and was discarded.
    Dropped(ProtocolError),
    /// The sender got a direct reply; nothing was broadcast or logged.
    Replied,
    /// The genesis sequence was broadcast. `record` is `None` when the
    /// event log append failed.
    Deployed {
        /// The appended audit record, if the append succeeded.
        record: Option<EventRecord>,
    },
}

/// Orchestration layer for the relay.
///
/// Owns the [`ConnectionRegistry`] and the [`EventLog`] for the process
/// lifetime. Each inbound frame is handled as one transaction: parse →
/// interpret → reply, or broadcast + append. Transactions are serialized,
/// so the two genesis frames of one deploy are never interleaved with
/// another deploy's frames and the log has a single writer.
#[derive(Debug)]
pub struct RelayService {
    registry: Arc<ConnectionRegistry>,
    event_log: Arc<EventLog>,
    server_id: String,
    dispatch: Mutex<()>,
}

impl RelayService {
    /// Creates a new `RelayService`.
    #[must_use]
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        event_log: Arc<EventLog>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            event_log,
            server_id: server_id.into(),
            dispatch: Mutex::new(()),
        }
    }

    /// Returns a reference to the inner [`ConnectionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Returns a reference to the inner [`EventLog`].
    #[must_use]
    pub fn event_log(&self) -> &Arc<EventLog> {
        &self.event_log
    }

    /// Returns the identifier stamped into `context.source`.
    #[must_use]
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// Registers a new connection and returns its id together with the
    /// queue its writer task should drain.
    pub async fn connect(&self) -> (ConnectionId, OutboundReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut id = ConnectionId::new();
        while !self.registry.register(id, tx.clone()).await {
            id = ConnectionId::new();
        }
        let total = self.registry.len().await;
        tracing::info!(connection = %id, total, "client connected");
        (id, rx)
    }

    /// Unregisters a connection. Safe to call more than once.
    pub async fn disconnect(&self, id: ConnectionId) {
        if self.registry.unregister(id).await {
            let total = self.registry.len().await;
            tracing::info!(connection = %id, total, "client disconnected");
        }
    }

    /// Handles one text frame received from `sender`.
    ///
    /// Frames that are not valid `COMMAND` frames are dropped with a
    /// diagnostic and never answered.
    pub async fn handle_text(&self, sender: ConnectionId, raw: &str) -> FrameOutcome {
        tracing::debug!(connection = %sender, frame = raw, "received");
        match parse_frame(raw) {
            Ok(InboundFrame::Command(command)) => self.handle_command(sender, &command).await,
            Err(e) => {
                tracing::warn!(connection = %sender, error = %e, "invalid message format");
                FrameOutcome::Dropped(e)
            }
        }
    }

    /// Interprets `command` and performs the resulting action.
    pub async fn handle_command(&self, sender: ConnectionId, command: &str) -> FrameOutcome {
        let _guard = self.dispatch.lock().await;
        match interpret(command) {
            Action::Deploy => FrameOutcome::Deployed {
                record: self.deploy().await,
            },
            Action::Reply(reply) => {
                if let Err(e) = self.registry.send_to(sender, &reply).await {
                    tracing::error!(connection = %sender, error = %e, "reply failed");
                }
                FrameOutcome::Replied
            }
        }
    }

    /// Broadcasts the announcement and the genesis event, then appends the
    /// audit record. A failed append is logged and does not undo the
    /// broadcasts.
    async fn deploy(&self) -> Option<EventRecord> {
        tracing::info!("genesis event triggered");

        self.broadcast(&OutboundMessage::system(GENESIS_ANNOUNCEMENT))
            .await;

        let payload = GenesisPayload::now();
        self.broadcast(&OutboundMessage::GenesisEvent(payload.clone()))
            .await;

        let context = CommandContext {
            source: self.server_id.clone(),
            command: DEPLOY_COMMAND.to_string(),
        };
        match self
            .event_log
            .append(EMIT_EVENT_TYPE, &payload, &context)
            .await
        {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    code = e.error_code(),
                    path = %self.event_log.path().display(),
                    "event log append failed"
                );
                None
            }
        }
    }

    async fn broadcast(&self, message: &OutboundMessage) {
        if let Err(e) = self.registry.broadcast(message).await {
            tracing::error!(message_type = message.type_str(), error = %e, "broadcast failed");
        }
    }
}
