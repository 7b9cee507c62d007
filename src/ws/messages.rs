//! Client → server frame parsing.
//!
//! The only dispatchable frame is `{ "type": "COMMAND", "payload": "<text>" }`.
//! Anything else parses to a [`ProtocolError`] and is dropped by the caller.

use serde::Deserialize;

use crate::error::ProtocolError;

/// Wire `type` of the command frame.
pub const COMMAND_FRAME_TYPE: &str = "COMMAND";

/// A frame the relay knows how to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A command line typed by the user.
    Command(String),
}

/// Loose envelope used to read `type` before committing to a payload shape.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    payload: serde_json::Value,
}

/// Parses a text frame.
///
/// # Errors
///
/// - [`ProtocolError::Malformed`] if `raw` is not a JSON object with a
///   string `type`.
/// - [`ProtocolError::UnsupportedType`] if `type` is not `COMMAND`.
/// - [`ProtocolError::InvalidPayload`] if a `COMMAND` frame has no string
///   `payload`.
pub fn parse_frame(raw: &str) -> Result<InboundFrame, ProtocolError> {
    // Decode as an object first so array-shaped input never maps onto fields.
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(raw).map_err(ProtocolError::Malformed)?;
    let frame = RawFrame::deserialize(serde_json::Value::Object(object))
        .map_err(ProtocolError::Malformed)?;
    if frame.frame_type != COMMAND_FRAME_TYPE {
        return Err(ProtocolError::UnsupportedType(frame.frame_type));
    }
    match frame.payload {
        serde_json::Value::String(command) => Ok(InboundFrame::Command(command)),
        _ => Err(ProtocolError::InvalidPayload),
    }
}
