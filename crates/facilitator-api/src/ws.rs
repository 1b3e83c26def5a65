//! `WebSocket` handler for the real-time channel.
//!
//! Clients connect to `GET /ws` and receive every [`Notification`] the hub
//! delivers as a JSON text frame: `{"channel": "...", "payload": {...}}`.
//! The channel is read-only; client frames other than ping and close are
//! ignored. When the hub closes, every socket is closed from the server
//! side.
//!
//! [`Notification`]: facilitator_core::Notification

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Attach to the hub and forward notifications until either side goes
/// away, then detach.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let hub = &state.services.hub;
    let Some(mut subscription) = hub.attach().await else {
        debug!("Hub closed, refusing WebSocket client");
        let _ = socket.send(Message::Close(None)).await;
        return;
    };
    let id = subscription.id();

    loop {
        tokio::select! {
            notification = subscription.recv() => {
                let Some(notification) = notification else {
                    debug!(connection = %id, "Hub closed, closing WebSocket");
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                };
                let json = match serde_json::to_string(notification.as_ref()) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!(connection = %id, channel = %notification.channel, "Failed to serialize notification: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(connection = %id, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(connection = %id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(connection = %id, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(connection = %id, "WebSocket error: {e}");
                        break;
                    }
                    // Read-only channel.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    hub.detach(id).await;
}
