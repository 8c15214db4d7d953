//! Reservation record types shared by the local store, the merger and the backend.

use crate::{ReservationId, TourId, UserId};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a reservation.
///
/// Statuses travel as plain strings. Values outside the known set are kept
/// verbatim in [`ReservationStatus::Other`] so nothing is lost on a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Other(String),
}

impl ReservationStatus {
    /// The statuses an admin can move a reservation between.
    pub const KNOWN: [ReservationStatus; 3] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Other(s) => s,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ReservationStatus::Cancelled)
    }
}

impl From<String> for ReservationStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => ReservationStatus::Pending,
            "confirmed" => ReservationStatus::Confirmed,
            "cancelled" => ReservationStatus::Cancelled,
            _ => ReservationStatus::Other(value),
        }
    }
}

impl From<&str> for ReservationStatus {
    fn from(value: &str) -> Self {
        ReservationStatus::from(value.to_string())
    }
}

impl From<ReservationStatus> for String {
    fn from(value: ReservationStatus) -> Self {
        match value {
            ReservationStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized tour snapshot carried on a reservation for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourSummary {
    pub id: TourId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl TourSummary {
    pub fn new(id: impl Into<TourId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            cover_image: None,
            duration: None,
        }
    }
}

/// A reservation as held by the local mirror and as returned by the backend.
///
/// The serialized form is the on-device storage format: snake_case keys with
/// the exception of `localOnly`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// Server-assigned id, or a `local-<ms>-<index>` placeholder
    pub id: ReservationId,
    /// Owning account
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default)]
    pub tour_id: TourId,
    /// Requested tour date (ISO calendar date)
    pub date: String,
    /// Number of participants
    pub pax: u32,
    pub status: ReservationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Existence or state not confirmed by the backend.
    /// Records persisted without the flag are treated as unconfirmed.
    #[serde(rename = "localOnly", default = "default_local_only")]
    pub local_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour: Option<TourSummary>,
}

fn default_local_only() -> bool {
    true
}

impl ReservationRecord {
    /// Create a pending, unconfirmed reservation.
    pub fn new(
        id: impl Into<ReservationId>,
        user_id: impl Into<UserId>,
        tour_id: impl Into<TourId>,
        date: impl Into<String>,
        pax: u32,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            user_email: None,
            tour_id: tour_id.into(),
            date: date.into(),
            pax,
            status: ReservationStatus::Pending,
            created_at: None,
            local_only: true,
            tour: None,
        }
    }

    /// Mark the record as known to the backend.
    pub fn confirmed_remote(mut self) -> Self {
        self.local_only = false;
        self
    }

    pub fn with_status(mut self, status: impl Into<ReservationStatus>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    pub fn with_tour(mut self, tour: TourSummary) -> Self {
        self.tour = Some(tour);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }

    /// Timestamp used for display ordering, in milliseconds since epoch.
    ///
    /// `created_at` is used when present, even if it does not parse; `date`
    /// is the fallback only when `created_at` is absent.
    pub fn effective_timestamp(&self) -> Option<i64> {
        match &self.created_at {
            Some(created_at) => parse_timestamp(created_at),
            None => parse_timestamp(&self.date),
        }
    }

    /// Merge the fields set in `patch` into this record.
    pub fn apply(&mut self, patch: &ReservationPatch) {
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        if let Some(pax) = patch.pax {
            self.pax = pax;
        }
        if let Some(local_only) = patch.local_only {
            self.local_only = local_only;
        }
        if let Some(created_at) = &patch.created_at {
            self.created_at = Some(created_at.clone());
        }
        if let Some(user_email) = &patch.user_email {
            self.user_email = Some(user_email.clone());
        }
        if let Some(tour) = &patch.tour {
            self.tour = Some(tour.clone());
        }
    }
}

/// A partial update to a [`ReservationRecord`]. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pax: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tour: Option<TourSummary>,
}

impl ReservationPatch {
    /// Patch that only changes the status.
    pub fn status(status: impl Into<ReservationStatus>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse an ISO-ish timestamp or calendar date into milliseconds since epoch.
///
/// Naive values are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    // Postgres text output, e.g. "2024-01-02 10:00:00.123+00"
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}
