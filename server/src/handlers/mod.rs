//! Request handlers.
//!
//! Routes extract and authenticate; handlers validate, talk to the database
//! and notify connected admin dashboards.

mod admin;
mod catalog;
mod profiles;
mod reservations;
mod websocket;

pub use admin::*;
pub use catalog::*;
pub use profiles::*;
pub use reservations::*;
pub use websocket::*;

use mccoy_engine::{ReservationRecord, ReservationStatus};
use serde::Serialize;
use sqlx::PgPool;

use crate::db::{self, ReservationRow};
use crate::websocket::{ConnectionManager, ServerMessage};

/// Response to a status change.
///
/// `reservation` is the re-read row, absent if it could not be re-read after
/// the update committed.
#[derive(Debug, Serialize)]
pub struct StatusChanged {
    pub id: String,
    pub status: ReservationStatus,
    pub reservation: Option<ReservationRecord>,
}

/// Re-read a reservation after a committed write and push it to admin
/// dashboards.
///
/// Best effort: the write already happened, so a failed re-read is logged and
/// never fails the request.
async fn publish_change(
    pool: &PgPool,
    conn_manager: &ConnectionManager,
    id: &str,
) -> Option<ReservationRecord> {
    announce(conn_manager, id, db::get_reservation(pool, id).await)
}

fn announce(
    conn_manager: &ConnectionManager,
    id: &str,
    lookup: Result<Option<ReservationRow>, sqlx::Error>,
) -> Option<ReservationRecord> {
    let record = match lookup {
        Ok(Some(row)) => row.to_record(),
        Ok(None) => {
            tracing::warn!(%id, "Reservation missing after write; admins not notified");
            return None;
        }
        Err(e) => {
            tracing::warn!(%id, "Failed to re-read reservation for admins: {}", e);
            return None;
        }
    };

    let sent = conn_manager.broadcast_all(ServerMessage::reservation_changed(record.clone()));
    tracing::debug!(%id, sent_to = sent, "Published reservation change");
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tokio::sync::mpsc;

    fn row(id: &str) -> ReservationRow {
        ReservationRow {
            id: id.into(),
            user_id: "u1".into(),
            user_email: None,
            tour_id: "rafting-extremo".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            pax: 2,
            status: "pending".into(),
            created_at: Utc.timestamp_millis_opt(1_706_745_600_000).unwrap(),
            tour_title: Some("Rafting Extremo".into()),
            tour_image_path: None,
            tour_duration: None,
        }
    }

    #[test]
    fn test_announce_broadcasts_reread_row() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register("admin-1".into(), tx);

        let record = announce(&manager, "res-1", Ok(Some(row("res-1")))).unwrap();

        assert_eq!(record.id, "res-1");
        assert!(!record.local_only);
        match rx.try_recv().unwrap() {
            ServerMessage::ReservationChanged { reservation } => assert_eq!(reservation.id, "res-1"),
            other => panic!("Expected ReservationChanged, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_reread_does_not_fail_the_write() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register("admin-1".into(), tx);

        assert!(announce(&manager, "res-1", Err(sqlx::Error::PoolTimedOut)).is_none());
        assert!(announce(&manager, "res-1", Ok(None)).is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_status_changed_serialization() {
        let body = StatusChanged {
            id: "res-1".into(),
            status: ReservationStatus::Cancelled,
            reservation: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "cancelled");
        assert!(json["reservation"].is_null());
    }
}
