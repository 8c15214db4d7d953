//! The engine's backend traits implemented over PostgreSQL.

use async_trait::async_trait;
use mccoy_engine::{
    AdminBackend, BackendError, CatalogBackend, ContactRequest, InsertedRow, NewReservation,
    Profile, ProfileBackend, ReservationBackend, ReservationRecord, ReservationStatus, Tour,
};

use super::{catalog, parse_date, reservations, InsertReservation, Pool};

/// PostgreSQL-backed [`ReservationBackend`] and friends.
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: Pool,
}

impl PgBackend {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn request_failed(e: sqlx::Error) -> BackendError {
    tracing::error!("Database error: {:?}", e);
    BackendError::Request(e.to_string())
}

/// Validate an engine row for insertion.
pub fn to_insert(row: &NewReservation) -> Result<InsertReservation, String> {
    let date = parse_date(&row.date).ok_or_else(|| format!("invalid date '{}'", row.date))?;
    let pax = i32::try_from(row.pax)
        .ok()
        .filter(|p| *p >= 1)
        .ok_or_else(|| format!("pax must be at least 1 (got {})", row.pax))?;
    if row.tour_id.trim().is_empty() {
        return Err("tour_id is required".to_string());
    }

    Ok(InsertReservation {
        user_id: row.user_id.clone(),
        user_email: row.user_email.clone(),
        tour_id: row.tour_id.clone(),
        date,
        pax,
        status: row.status.to_string(),
        comments: row.comments.clone(),
    })
}

#[async_trait]
impl ReservationBackend for PgBackend {
    async fn list_reservations(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReservationRecord>, BackendError> {
        let rows = reservations::list_for_user(&self.pool, user_id)
            .await
            .map_err(request_failed)?;
        Ok(rows.iter().map(|r| r.to_record()).collect())
    }

    async fn insert_reservations(
        &self,
        rows: &[NewReservation],
    ) -> Result<Vec<InsertedRow>, BackendError> {
        let inserts = rows
            .iter()
            .map(to_insert)
            .collect::<Result<Vec<_>, _>>()
            .map_err(BackendError::Request)?;

        let ids = reservations::insert_many(&self.pool, &inserts)
            .await
            .map_err(request_failed)?;
        Ok(ids.into_iter().map(InsertedRow::with_id).collect())
    }

    async fn update_status(
        &self,
        id: &str,
        user_id: &str,
        status: ReservationStatus,
    ) -> Result<(), BackendError> {
        let updated = reservations::update_status_for_owner(&self.pool, id, user_id, status.as_str())
            .await
            .map_err(request_failed)?;
        if updated == 0 {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for PgBackend {
    async fn list_all_reservations(&self) -> Result<Vec<ReservationRecord>, BackendError> {
        let rows = reservations::list_all(&self.pool)
            .await
            .map_err(request_failed)?;
        Ok(rows.iter().map(|r| r.to_record()).collect())
    }

    async fn set_status(&self, id: &str, status: ReservationStatus) -> Result<(), BackendError> {
        let updated = reservations::set_status(&self.pool, id, status.as_str())
            .await
            .map_err(request_failed)?;
        if updated == 0 {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileBackend for PgBackend {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        let row = catalog::get_profile(&self.pool, user_id)
            .await
            .map_err(request_failed)?;
        Ok(row.map(|r| r.to_profile()))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), BackendError> {
        catalog::insert_profile(&self.pool, profile)
            .await
            .map_err(request_failed)?;
        Ok(())
    }
}

#[async_trait]
impl CatalogBackend for PgBackend {
    async fn list_tours(&self) -> Result<Vec<Tour>, BackendError> {
        let rows = catalog::list_tours(&self.pool)
            .await
            .map_err(request_failed)?;
        Ok(rows.into_iter().map(Tour::from).collect())
    }

    async fn submit_contact(&self, request: &ContactRequest) -> Result<(), BackendError> {
        catalog::insert_contact_request(&self.pool, request)
            .await
            .map_err(request_failed)
    }
}
