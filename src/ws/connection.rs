//! WebSocket connection lifecycle.
//!
//! Runs the read loop for a single client and a separate writer task that
//! drains the client's outbound queue into the socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::service::RelayService;

/// Runs a connection from upgrade to close.
///
/// - Registers the connection and spawns its writer task.
/// - Feeds every text frame to [`RelayService::handle_text`], one at a
///   time, in arrival order.
/// - Unregisters on close, read error, or writer failure.
pub async fn run_connection(socket: WebSocket, relay: Arc<RelayService>) {
    let (id, mut outbound_rx) = relay.connect().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(e) = ws_tx.send(Message::Text(frame)).await {
                tracing::debug!(error = %e, "ws send failed");
                break;
            }
        }
    });

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = relay.handle_text(id, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            let _ = relay.handle_text(id, text).await;
                        }
                        Err(_) => {
                            tracing::warn!(connection = %id, len = bytes.len(), "dropping non-utf8 binary frame");
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection = %id, error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Writer stopped: the socket can no longer be written to.
            _ = &mut writer => break,
        }
    }

    relay.disconnect(id).await;
    writer.abort();
    tracing::debug!(connection = %id, "ws connection closed");
}
