//! genesis-relay server entry point.
//!
//! Starts the Axum server with the WebSocket relay and system endpoints.

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use genesis_relay::api;
use genesis_relay::app_state::AppState;
use genesis_relay::config::{LogFormat, RelayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        event_log = %config.event_log_path.display(),
        server_id = %config.server_id,
        "starting genesis-relay"
    );

    let app_state = AppState::from_config(&config);

    // Build router
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "server listening");
    println!("Genesis relay listening on ws://{local_addr}");
    println!("Waiting for the Big Boss to trigger the Genesis Event...");

    axum::serve(listener, app).await?;

    Ok(())
}
