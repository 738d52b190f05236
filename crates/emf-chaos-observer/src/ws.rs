//! `WebSocket` handler streaming published snapshots.
//!
//! Clients connect to `GET /ws/snapshots` and receive the current snapshot
//! immediately, then one JSON text frame per newly published snapshot. A
//! slow client skips intermediate ticks and resumes from the latest. When
//! the scheduler stops, the server sends a close frame.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade to a `WebSocket` and begin streaming snapshots.
///
/// # Route
///
/// `GET /ws/snapshots`
pub async fn ws_snapshots(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    let mut reader = state.reader.clone();

    loop {
        tokio::select! {
            next = reader.next_snapshot() => {
                let Some(snapshot) = next else {
                    debug!("Snapshot slot closed, shutting down WebSocket");
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                };
                let json = match serde_json::to_string(&*snapshot) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!(tick = snapshot.tick, "Failed to serialize snapshot: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!("WebSocket client disconnected (send failed)");
                    return;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
