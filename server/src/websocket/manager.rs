//! WebSocket connection manager.
//!
//! Tracks connected admin dashboards and fans reservation changes out to them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::ServerMessage;

/// Sender for WebSocket messages.
pub type MessageSender = mpsc::UnboundedSender<ServerMessage>;

/// A single WebSocket connection.
#[derive(Debug)]
pub struct Connection {
    pub id: String,
    /// Admin user behind the connection
    pub user_id: String,
    pub sender: MessageSender,
}

/// Manages active WebSocket connections.
///
/// Thread-safe and can be shared across handlers via `Arc`.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    connections: DashMap<String, Connection>,
    /// Connection ids per user, a user may have several dashboards open
    by_user: DashMap<String, Vec<String>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new connection manager wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection. Returns the connection ID.
    pub fn register(&self, user_id: String, sender: MessageSender) -> String {
        let conn_id = uuid::Uuid::new_v4().to_string();

        self.connections.insert(
            conn_id.clone(),
            Connection {
                id: conn_id.clone(),
                user_id: user_id.clone(),
                sender,
            },
        );
        self.by_user.entry(user_id).or_default().push(conn_id.clone());

        tracing::info!(conn_id = %conn_id, "WebSocket connection registered");
        conn_id
    }

    /// Unregister a connection.
    pub fn unregister(&self, conn_id: &str) {
        if let Some((_, conn)) = self.connections.remove(conn_id) {
            if let Some(mut conn_ids) = self.by_user.get_mut(&conn.user_id) {
                conn_ids.retain(|id| id != conn_id);
                if conn_ids.is_empty() {
                    drop(conn_ids);
                    self.by_user.remove(&conn.user_id);
                }
            }

            tracing::info!(conn_id = %conn.id, user_id = %conn.user_id, "WebSocket connection unregistered");
        }
    }

    /// Broadcast a message to all connections.
    ///
    /// Returns the number of connections that received the message.
    pub fn broadcast_all(&self, message: ServerMessage) -> usize {
        let mut sent_count = 0;

        for entry in self.connections.iter() {
            if entry.value().sender.send(message.clone()).is_ok() {
                sent_count += 1;
            }
        }

        tracing::debug!(recipients = sent_count, "Broadcast message to connections");
        sent_count
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, conn_id: &str, message: ServerMessage) -> bool {
        match self.connections.get(conn_id) {
            Some(conn) => conn.sender.send(message).is_ok(),
            None => false,
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of distinct users connected.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mccoy_engine::ReservationRecord;

    #[test]
    fn test_register_unregister() {
        let manager = ConnectionManager::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let first = manager.register("admin-1".to_string(), tx1);
        let second = manager.register("admin-1".to_string(), tx2);
        assert_eq!(manager.connection_count(), 2);
        assert_eq!(manager.user_count(), 1);

        manager.unregister(&first);
        assert_eq!(manager.user_count(), 1);
        manager.unregister(&second);
        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.user_count(), 0);
    }

    #[test]
    fn test_broadcast_reaches_every_connection() {
        let manager = ConnectionManager::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        manager.register("admin-1".to_string(), tx1);
        manager.register("admin-2".to_string(), tx2);

        let record = ReservationRecord::new("res-1", "u1", "t1", "2024-03-01", 2);
        let sent = manager.broadcast_all(ServerMessage::reservation_changed(record));
        assert_eq!(sent, 2);

        assert!(matches!(rx1.try_recv().unwrap(), ServerMessage::ReservationChanged { .. }));
        assert!(matches!(rx2.try_recv().unwrap(), ServerMessage::ReservationChanged { .. }));
    }

    #[test]
    fn test_closed_receivers_are_skipped() {
        let manager = ConnectionManager::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = manager.register("admin-1".to_string(), tx);
        drop(rx);

        assert_eq!(manager.broadcast_all(ServerMessage::Pong), 0);
        assert!(!manager.send_to(&conn_id, ServerMessage::Pong));
        assert!(!manager.send_to("unknown", ServerMessage::Pong));
    }
}
