//! WebSocket message protocol definitions.
//!
//! All messages are JSON-encoded and use snake_case for field names.
//! Reservations travel in the engine's storage format.

use mccoy_engine::ReservationRecord;
use serde::{Deserialize, Serialize};

/// Messages sent from an admin client to the server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request the full reservation list.
    Refresh {
        /// Request ID for correlating responses
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Keep-alive ping.
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Response to a refresh request.
    Reservations {
        /// All reservations, earliest tour date first
        reservations: Vec<ReservationRecord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// A reservation was created or changed status.
    ReservationChanged { reservation: ReservationRecord },

    /// Response to ping.
    Pong,

    /// Error message.
    Error {
        /// Error description
        message: String,
        /// Request ID from the original request (if applicable)
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl ServerMessage {
    /// Create an error message.
    pub fn error(message: impl Into<String>, request_id: Option<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
            request_id,
        }
    }

    pub fn reservation_changed(reservation: ReservationRecord) -> Self {
        ServerMessage::ReservationChanged { reservation }
    }
}
