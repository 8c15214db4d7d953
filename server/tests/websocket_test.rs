//! Unit tests for the admin WebSocket protocol.
//!
//! The server's message enums live in the binary, so the client's view of
//! them is mirrored here.

use mccoy_engine::{ReservationRecord, TourSummary};
use serde_json::json;

/// Test helper to create a confirmed reservation.
fn create_test_record(id: &str, date: &str, status: &str) -> ReservationRecord {
    ReservationRecord::new(id, "u1", "rafting-extremo", date, 2)
        .confirmed_remote()
        .with_status(status)
        .with_created_at("2024-02-01T10:00:00.000Z")
        .with_tour(TourSummary::new("rafting-extremo", "Rafting Extremo"))
}

#[cfg(test)]
mod websocket_protocol_tests {
    use super::*;

    #[derive(serde::Deserialize, serde::Serialize, PartialEq, Debug)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum ClientMessage {
        Refresh {
            #[serde(default)]
            request_id: Option<String>,
        },
        Ping,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum ServerMessage {
        Reservations {
            reservations: Vec<ReservationRecord>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            request_id: Option<String>,
        },
        ReservationChanged {
            reservation: ReservationRecord,
        },
        Pong,
        Error {
            message: String,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            request_id: Option<String>,
        },
    }

    #[test]
    fn test_client_message_refresh_deserialization() {
        let json = r#"{"type": "refresh", "request_id": "req-001"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Refresh {
                request_id: Some("req-001".to_string())
            }
        );

        let msg: ClientMessage = serde_json::from_str(r#"{"type": "refresh"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Refresh { request_id: None });
    }

    #[test]
    fn test_client_message_ping_serialization() {
        let json = serde_json::to_string(&ClientMessage::Ping).unwrap();
        assert_eq!(json, r#"{"type":"ping"}"#);
    }

    #[test]
    fn test_reservations_response_serialization() {
        let msg = ServerMessage::Reservations {
            reservations: vec![
                create_test_record("res-1", "2024-03-01", "pending"),
                create_test_record("res-2", "2024-03-05", "confirmed"),
            ],
            request_id: Some("req-001".to_string()),
        };

        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "reservations");
        assert_eq!(json["request_id"], "req-001");
        assert_eq!(json["reservations"][0]["id"], "res-1");
        assert_eq!(json["reservations"][1]["status"], "confirmed");
        assert_eq!(json["reservations"][1]["localOnly"], false);
    }

    #[test]
    fn test_reservation_changed_round_trip() {
        let json = json!({
            "type": "reservation_changed",
            "reservation": {
                "id": "res-9",
                "user_id": "u1",
                "user_email": "ana@example.com",
                "tour_id": "canopy-sendero",
                "date": "2024-04-10",
                "pax": 3,
                "status": "cancelled",
                "created_at": "2024-02-01T10:00:00.000Z",
                "localOnly": false,
                "tour": {"id": "canopy-sendero", "title": "Canopy & Sendero"}
            }
        });

        let msg: ServerMessage = serde_json::from_value(json).unwrap();
        match msg {
            ServerMessage::ReservationChanged { reservation } => {
                assert_eq!(reservation.id, "res-9");
                assert!(reservation.is_cancelled());
                assert!(!reservation.local_only);
                assert_eq!(reservation.user_email.as_deref(), Some("ana@example.com"));
            }
            other => panic!("Expected ReservationChanged, got {:?}", other),
        }
    }

    #[test]
    fn test_server_message_pong_serialization() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_server_message_error_serialization() {
        let msg = ServerMessage::Error {
            message: "Invalid message format".to_string(),
            request_id: None,
        };

        let json = serde_json::to_string(&msg).unwrap();

        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""message":"Invalid message format""#));
        assert!(!json.contains("request_id"));
    }
}
