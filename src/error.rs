//! Relay error types.
//!
//! [`RelayError`] is the central error type for the relay. None of its
//! variants are ever shown to WebSocket clients; they surface in server-side
//! diagnostics, and as structured JSON bodies on the HTTP endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "persistence error: permission denied"
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Why an inbound frame was rejected.
///
/// Every variant is recovered locally: the frame is dropped, nothing is
/// sent back to the client.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON, or has no string `type` field.
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The frame parsed but its `type` is not one the relay dispatches.
    #[error("unsupported frame type: {0}")]
    UnsupportedType(String),

    /// A `COMMAND` frame whose `payload` is missing or not a string.
    #[error("command payload must be a string")]
    InvalidPayload,
}

/// Server-side error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category    |
/// |-----------|-------------|
/// | 1000–1999 | Protocol    |
/// | 3000–3999 | Server      |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Inbound frame could not be dispatched.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Event log could not be written or read.
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// A value could not be encoded to or decoded from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Protocol(ProtocolError::Malformed(_)) => 1001,
            Self::Protocol(ProtocolError::UnsupportedType(_)) => 1002,
            Self::Protocol(ProtocolError::InvalidPayload) => 1003,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
            Self::Serialization(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Protocol(_) => StatusCode::BAD_REQUEST,
            Self::Persistence(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn protocol_variants_have_distinct_codes() {
        let malformed = match serde_json::from_str::<serde_json::Value>("{not json") {
            Err(e) => RelayError::from(ProtocolError::Malformed(e)),
            Ok(_) => panic!("expected parse failure"),
        };
        let unsupported = RelayError::from(ProtocolError::UnsupportedType("PING".to_string()));
        let invalid = RelayError::from(ProtocolError::InvalidPayload);

        assert_eq!(malformed.error_code(), 1001);
        assert_eq!(unsupported.error_code(), 1002);
        assert_eq!(invalid.error_code(), 1003);
        assert_eq!(unsupported.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_error_maps_to_persistence() {
        let err = RelayError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.error_code(), 3001);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("persistence error"));
    }

    #[test]
    fn into_response_sets_status() {
        let response = RelayError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
