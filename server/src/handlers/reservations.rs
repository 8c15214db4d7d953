//! Customer reservation handlers.

use std::collections::HashSet;

use mccoy_engine::{InsertedRow, NewReservation, ReservationRecord, ReservationStatus};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::AuthUser;
use crate::db::{self, InsertReservation};
use crate::error::{AppError, Result};
use crate::websocket::ConnectionManager;

use super::{publish_change, StatusChanged};

/// Body of a status change request.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ReservationStatus,
}

/// List the caller's reservations, newest first.
pub async fn handle_list_reservations(
    pool: &PgPool,
    user: &AuthUser,
) -> Result<Vec<ReservationRecord>> {
    let rows = db::list_for_user(pool, &user.user_id).await?;
    tracing::debug!(user_id = %user.user_id, count = rows.len(), "Listed reservations");
    Ok(rows.iter().map(|r| r.to_record()).collect())
}

/// Validate a checkout batch for the caller.
///
/// Rows must belong to the caller and start out pending. A missing email is
/// taken from the request headers.
pub fn prepare_rows(user: &AuthUser, rows: &[NewReservation]) -> Result<Vec<InsertReservation>> {
    if rows.is_empty() {
        return Err(AppError::BadRequest("No reservations to create".to_string()));
    }

    rows.iter()
        .map(|row| {
            if row.user_id != user.user_id {
                return Err(AppError::Forbidden(
                    "Reservations can only be created for the signed-in user".to_string(),
                ));
            }
            if row.status != ReservationStatus::Pending {
                return Err(AppError::BadRequest(format!(
                    "New reservations must be pending (got '{}')",
                    row.status
                )));
            }

            let mut insert = db::to_insert(row).map_err(AppError::BadRequest)?;
            if insert.user_email.is_none() {
                insert.user_email = user.email.clone();
            }
            Ok(insert)
        })
        .collect()
}

/// Insert a checkout batch and notify admins of each new reservation.
pub async fn handle_create_reservations(
    pool: &PgPool,
    conn_manager: &ConnectionManager,
    user: &AuthUser,
    rows: Vec<NewReservation>,
) -> Result<Vec<InsertedRow>> {
    let inserts = prepare_rows(user, &rows)?;

    let tour_ids: Vec<String> = inserts
        .iter()
        .map(|r| r.tour_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let known: HashSet<String> = db::existing_tour_ids(pool, &tour_ids)
        .await?
        .into_iter()
        .collect();
    if let Some(unknown) = tour_ids.iter().find(|id| !known.contains(*id)) {
        return Err(AppError::BadRequest(format!("Unknown tour '{}'", unknown)));
    }

    let ids = db::insert_many(pool, &inserts).await?;
    tracing::info!(user_id = %user.user_id, count = ids.len(), "Reservations created");

    for id in &ids {
        publish_change(pool, conn_manager, id).await;
    }

    Ok(ids.into_iter().map(InsertedRow::with_id).collect())
}

/// Status change by the reservation's owner. Owners may only cancel.
pub async fn handle_owner_status(
    pool: &PgPool,
    conn_manager: &ConnectionManager,
    user: &AuthUser,
    id: &str,
    update: StatusUpdate,
) -> Result<StatusChanged> {
    if !update.status.is_cancelled() {
        return Err(AppError::Forbidden(
            "Customers may only cancel their reservations".to_string(),
        ));
    }

    let updated =
        db::update_status_for_owner(pool, id, &user.user_id, update.status.as_str()).await?;
    if updated == 0 {
        return Err(AppError::NotFound(format!("Reservation {}", id)));
    }

    tracing::info!(%id, user_id = %user.user_id, "Reservation cancelled by owner");
    Ok(StatusChanged {
        id: id.to_string(),
        reservation: publish_change(pool, conn_manager, id).await,
        status: update.status,
    })
}
