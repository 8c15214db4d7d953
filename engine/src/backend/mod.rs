//! Backend collaborator surface.
//!
//! The engine never talks to a database or the network itself. Everything it
//! needs from the record of truth is expressed as the async traits below, so a
//! host can plug in an HTTP client, a test double, or [`InMemoryBackend`].

mod memory;

pub use memory::InMemoryBackend;

use crate::{session::Role, ReservationId, ReservationRecord, ReservationStatus, TourId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by a backend call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied")]
    PermissionDenied,
}

/// A reservation row submitted for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub user_id: UserId,
    #[serde(default)]
    pub user_email: Option<String>,
    pub tour_id: TourId,
    pub date: String,
    pub pax: u32,
    pub status: ReservationStatus,
    #[serde(default)]
    pub comments: Option<String>,
}

/// What the backend returned for one inserted row.
///
/// An accepted row may come back without an id; callers treat that as an
/// unconfirmed insert rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertedRow {
    #[serde(default)]
    pub id: Option<ReservationId>,
}

impl InsertedRow {
    pub fn with_id(id: impl Into<ReservationId>) -> Self {
        Self { id: Some(id.into()) }
    }
}

/// A bookable tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: TourId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub duration: String,
    pub difficulty: String,
    /// Price per participant in USD
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Account profile row; only the role matters to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub role: Role,
}

impl Profile {
    pub fn customer(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            role: Role::Customer,
        }
    }
}

/// A message from the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Reservation reads and writes scoped to one owner.
#[async_trait]
pub trait ReservationBackend: Send + Sync {
    /// The owner's reservations, newest `created_at` first, with tour summaries.
    async fn list_reservations(&self, user_id: &str)
        -> Result<Vec<ReservationRecord>, BackendError>;

    /// Insert rows in one batch. The result may hold fewer rows than the input.
    async fn insert_reservations(
        &self,
        rows: &[NewReservation],
    ) -> Result<Vec<InsertedRow>, BackendError>;

    /// Set the status of the reservation matching both `id` and `user_id`.
    async fn update_status(
        &self,
        id: &str,
        user_id: &str,
        status: ReservationStatus,
    ) -> Result<(), BackendError>;
}

/// Unscoped reservation access for administrators.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// Every reservation, earliest tour `date` first.
    async fn list_all_reservations(&self) -> Result<Vec<ReservationRecord>, BackendError>;

    async fn set_status(&self, id: &str, status: ReservationStatus) -> Result<(), BackendError>;
}

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError>;

    async fn insert_profile(&self, profile: &Profile) -> Result<(), BackendError>;
}

#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Tours ordered by title.
    async fn list_tours(&self) -> Result<Vec<Tour>, BackendError>;

    async fn submit_contact(&self, request: &ContactRequest) -> Result<(), BackendError>;
}
