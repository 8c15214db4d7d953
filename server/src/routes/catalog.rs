//! Public catalog and contact routes. No authentication.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mccoy_engine::{ContactRequest, Tour};

use crate::error::Result;
use crate::handlers::{handle_contact, handle_list_tours};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tours", get(tours_handler))
        .route("/contact", post(contact_handler))
}

/// GET /tours - All tours ordered by title.
async fn tours_handler(State(state): State<AppState>) -> Result<Json<Vec<Tour>>> {
    let backend = state.backend();
    Ok(Json(handle_list_tours(&backend).await?))
}

/// POST /contact - Store a contact form submission.
async fn contact_handler(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<StatusCode> {
    let backend = state.backend();
    handle_contact(&backend, request).await?;
    Ok(StatusCode::CREATED)
}
