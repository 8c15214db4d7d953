//! Error types for the McCoy engine.

use crate::{backend::BackendError, ReservationId};
use thiserror::Error;

/// All errors surfaced to callers of the engine.
///
/// Local storage problems never appear here; they degrade silently inside the
/// store layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Cart errors
    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid cart item: {0}")]
    InvalidCartItem(String),

    // Backend errors
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("reservation was accepted but not confirmed by the backend")]
    Unconfirmed,

    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    // Authorization errors
    #[error("admin role required")]
    NotAdmin,

    // Contact form errors
    #[error("invalid contact request: {0}")]
    InvalidContact(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
