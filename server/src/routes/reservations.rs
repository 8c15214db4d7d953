//! Customer reservation routes.

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use mccoy_engine::{InsertedRow, NewReservation, ReservationRecord};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{
    handle_create_reservations, handle_list_reservations, handle_owner_status, StatusChanged,
    StatusUpdate,
};
use crate::AppState;

/// Create reservation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list_handler).post(create_handler))
        .route("/reservations/{id}/status", patch(status_handler))
}

/// GET /reservations - The caller's reservations.
async fn list_handler(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ReservationRecord>>> {
    let reservations = handle_list_reservations(&state.pool, &auth).await?;
    Ok(Json(reservations))
}

/// POST /reservations - Insert a checkout batch.
async fn create_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(rows): Json<Vec<NewReservation>>,
) -> Result<Json<Vec<InsertedRow>>> {
    let inserted =
        handle_create_reservations(&state.pool, &state.conn_manager, &auth, rows).await?;
    Ok(Json(inserted))
}

/// PATCH /reservations/{id}/status - Owner cancellation.
async fn status_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<StatusChanged>> {
    let changed =
        handle_owner_status(&state.pool, &state.conn_manager, &auth, &id, update).await?;
    Ok(Json(changed))
}
