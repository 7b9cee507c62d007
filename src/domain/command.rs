//! Command interpreter.
//!
//! Maps a raw command line to an [`Action`]. Pure: no I/O, no clock. The
//! caller performs whatever side effects the action calls for.

use super::relay_message::OutboundMessage;

/// The only privileged command the relay recognizes.
pub const DEPLOY_COMMAND: &str = "/deploy";

/// What the relay should do in response to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Broadcast the genesis sequence and append an audit record.
    Deploy,
    /// Send this message back to the sender only.
    Reply(OutboundMessage),
}

/// Interprets a raw command line.
///
/// Matching trims surrounding whitespace and ignores case, and is exact
/// (`/deployx` does not match). The unknown-command reply echoes `raw`
/// untouched.
#[must_use]
pub fn interpret(raw: &str) -> Action {
    if raw.trim().eq_ignore_ascii_case(DEPLOY_COMMAND) {
        Action::Deploy
    } else {
        Action::Reply(OutboundMessage::system(format!("Unknown command: {raw}")))
    }
}
