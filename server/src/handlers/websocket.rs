//! WebSocket handler for the admin dashboard.
//!
//! Admins receive a `reservation_changed` event for every write made through
//! the HTTP API and may request the full list at any time.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::auth::AdminUser;
use crate::db::PgBackend;
use crate::websocket::{ClientMessage, ConnectionManager, ServerMessage};

use super::handle_admin_list;

/// Handle an established admin WebSocket connection.
///
/// Registers the connection, forwards queued messages to the socket from a
/// spawned task, answers client requests until the socket closes, then
/// unregisters.
pub async fn handle_websocket_connection(
    socket: WebSocket,
    backend: PgBackend,
    conn_manager: Arc<ConnectionManager>,
    admin: AdminUser,
) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let user_id = admin.user.user_id.clone();
    let conn_id = conn_manager.register(user_id.clone(), tx);

    tracing::info!(
        conn_id = %conn_id,
        user_id = %user_id,
        "Admin dashboard connected"
    );

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                        tracing::warn!("Failed to send WebSocket message: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize WebSocket message: {}", e);
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = process_message(&text, &backend, &admin).await;
                conn_manager.send_to(&conn_id, response);
            }
            Ok(Message::Binary(_)) => {
                tracing::warn!("Binary messages not supported");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                tracing::info!(conn_id = %conn_id, "WebSocket close frame received");
                break;
            }
            Err(e) => {
                tracing::warn!(conn_id = %conn_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    conn_manager.unregister(&conn_id);
    send_task.abort();

    tracing::info!(
        conn_id = %conn_id,
        user_id = %user_id,
        active_connections = conn_manager.connection_count(),
        admins_online = conn_manager.user_count(),
        "Admin dashboard disconnected"
    );
}

async fn process_message(text: &str, backend: &PgBackend, admin: &AdminUser) -> ServerMessage {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            return ServerMessage::error(format!("Invalid message format: {}", e), None);
        }
    };

    match client_msg {
        ClientMessage::Refresh { request_id } => match handle_admin_list(backend, admin).await {
            Ok(reservations) => ServerMessage::Reservations {
                reservations,
                request_id,
            },
            Err(e) => ServerMessage::error(e.to_string(), request_id),
        },
        ClientMessage::Ping => ServerMessage::Pong,
    }
}
