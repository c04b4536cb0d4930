use std::sync::atomic::Ordering;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;

use crate::api::ws_types::{AlertingStatusData, WsMessage};
use crate::AppState;

/// Alerts replayed to a client right after it connects.
const BACKLOG: usize = 10;

pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Serialize and send one message. Returns false once the client is gone.
async fn send_message(socket: &mut WebSocket, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WsMessage");
            true
        }
    }
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    tracing::info!("Alert stream client connected");

    // Subscribe before replaying so nothing falls between backlog and live feed.
    let mut rx = state.ws_tx.subscribe();

    let paused = state.pause_flag.load(Ordering::Relaxed);
    if !send_message(&mut socket, &WsMessage::AlertingStatus(AlertingStatusData { paused })).await {
        return;
    }

    // Oldest first, so the client sees them in delivery order.
    let mut backlog = state.history.recent(BACKLOG);
    backlog.reverse();
    for record in backlog {
        if !send_message(&mut socket, &WsMessage::OpportunityAlert(record.opportunity)).await {
            return;
        }
    }

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Ok(ws_msg) => {
                        if !send_message(&mut socket, &ws_msg).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Alert stream client lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            client_msg = socket.recv() => {
                match client_msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {} // clients only listen
                    Some(Err(_)) => break,
                }
            }
        }
    }

    tracing::info!("Alert stream client disconnected");
}
