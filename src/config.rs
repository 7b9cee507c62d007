//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default bind address. The browser client connects to port 8080.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default location of the append-only event log.
pub const DEFAULT_EVENT_LOG_PATH: &str = "adk/output/event_log.jsonl";

/// Default `context.source` stamped on emitted event records.
pub const DEFAULT_SERVER_ID: &str = "ghost_void_server";

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP/WebSocket server to.
    pub listen_addr: SocketAddr,

    /// Path of the JSONL event log. Parent directories are created on
    /// first append.
    pub event_log_path: PathBuf,

    /// Identifier written into `context.source` of every event record.
    pub server_id: String,

    /// Whether to `fsync` the event log after every append.
    pub event_log_fsync: bool,

    /// Diagnostics output format.
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()?;

        let event_log_path = std::env::var("EVENT_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_EVENT_LOG_PATH));

        let server_id =
            std::env::var("SERVER_ID").unwrap_or_else(|_| DEFAULT_SERVER_ID.to_string());

        let event_log_fsync = parse_env_bool("EVENT_LOG_FSYNC", false);

        let log_format = std::env::var("LOG_FORMAT")
            .map(|raw| parse_log_format(&raw))
            .unwrap_or(LogFormat::Text);

        Ok(Self {
            listen_addr,
            event_log_path,
            server_id,
            event_log_fsync,
            log_format,
        })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            event_log_path: PathBuf::from(DEFAULT_EVENT_LOG_PATH),
            server_id: DEFAULT_SERVER_ID.to_string(),
            event_log_fsync: false,
            log_format: LogFormat::Text,
        }
    }
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|raw| parse_bool(&raw))
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Some(false)
    } else {
        None
    }
}

/// `json` in any case selects JSON output; anything else is text.
fn parse_log_format(raw: &str) -> LogFormat {
    if raw.trim().eq_ignore_ascii_case("json") {
        LogFormat::Json
    } else {
        LogFormat::Text
    }
}
