//! Admin routes. Every handler requires an [`AdminUser`].

use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use mccoy_engine::ReservationRecord;

use crate::auth::AdminUser;
use crate::error::Result;
use crate::handlers::{
    handle_admin_list, handle_admin_status, handle_websocket_connection, StatusChanged,
    StatusUpdate,
};
use crate::AppState;

/// Create admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/reservations", get(list_handler))
        .route("/admin/reservations/{id}/status", patch(status_handler))
        .route("/admin/ws", get(ws_handler))
}

/// GET /admin/reservations - Every reservation.
async fn list_handler(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<Vec<ReservationRecord>>> {
    let backend = state.backend();
    let reservations = handle_admin_list(&backend, &admin).await?;
    Ok(Json(reservations))
}

/// PATCH /admin/reservations/{id}/status - Set any known status.
async fn status_handler(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<StatusChanged>> {
    let changed =
        handle_admin_status(&state.pool, &state.conn_manager, &admin, &id, update).await?;
    Ok(Json(changed))
}

/// GET /admin/ws - Live reservation updates.
async fn ws_handler(
    State(state): State<AppState>,
    admin: AdminUser,
    ws: WebSocketUpgrade,
) -> Response {
    let backend = state.backend();
    let conn_manager = state.conn_manager.clone();
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, backend, conn_manager, admin))
}
