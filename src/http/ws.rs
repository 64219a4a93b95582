use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, error};

use crate::domain::notification::Notification;
use crate::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum ClientFrame {
    Join(String),
}

#[derive(Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum ServerFrame {
    NewNotification(Notification),
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One task per connection; it owns the socket for its whole life. Pushed
/// notifications arrive on the connection's channel and are written between
/// reads, so nothing else ever touches the sink.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let connection = state.broker.connection_id();
    let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
    let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

    debug!(connection, "realtime session opened");

    loop {
        tokio::select! {
            pushed = rx.recv() => {
                // The task keeps its own sender alive, so recv only yields
                // published notifications.
                let Some(notification) = pushed else { break };
                match serde_json::to_string(&ServerFrame::NewNotification(notification)) {
                    Ok(frame) => {
                        if socket.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        error!(error = ?err, connection, "failed to encode realtime frame");
                    }
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(ClientFrame::Join(user_id)) => {
                                debug!(connection, user_id = %user_id, "joined room");
                                state.broker.join(connection, &user_id, tx.clone());
                            }
                            Err(err) => {
                                debug!(error = ?err, connection, "ignoring unrecognized frame");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(error = ?err, connection, "realtime read failed");
                        break;
                    }
                }
            }
            _ = heartbeat.tick() => {
                if socket.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.broker.leave(connection);
    debug!(connection, "realtime session closed");
}
