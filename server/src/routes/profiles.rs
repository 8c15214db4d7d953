//! Profile routes.

use axum::{extract::State, routing::get, Json, Router};
use mccoy_engine::Profile;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{handle_ensure_profile, handle_get_profile};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profiles/me", get(get_handler).post(ensure_handler))
}

/// GET /profiles/me - The caller's profile or `null`.
async fn get_handler(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Option<Profile>>> {
    let backend = state.backend();
    Ok(Json(handle_get_profile(&backend, &auth).await?))
}

/// POST /profiles/me - Create a customer profile if missing.
async fn ensure_handler(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Profile>> {
    let backend = state.backend();
    Ok(Json(handle_ensure_profile(&backend, &auth).await?))
}
