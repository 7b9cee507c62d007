//! Domain layer: connection identity, the connection registry, the
//! command interpreter, and the frames the relay sends.

pub mod command;
pub mod connection_id;
pub mod connection_registry;
pub mod relay_message;

pub use command::{Action, interpret};
pub use connection_id::ConnectionId;
pub use connection_registry::ConnectionRegistry;
pub use relay_message::{GenesisPayload, OutboundMessage};
