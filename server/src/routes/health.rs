//! Liveness and readiness endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::db;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub database: &'static str,
    /// Admin dashboards currently connected
    pub admin_connections: usize,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/", get(root))
}

/// GET /health - Process is up. Never touches the database.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready - 503 while the database is unreachable.
async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (status, database) = match db::ping(&state.pool).await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(ReadyResponse {
            database,
            admin_connections: state.conn_manager.connection_count(),
        }),
    )
}

async fn root() -> &'static str {
    "McCoy Tours API"
}
