//! In-process backend used by tests, demos and offline tooling.

use super::{
    AdminBackend, BackendError, CatalogBackend, ContactRequest, InsertedRow, NewReservation,
    Profile, ProfileBackend, ReservationBackend, Tour,
};
use crate::{ReservationRecord, ReservationStatus, TourSummary, UserId};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    tours: Vec<Tour>,
    reservations: Vec<ReservationRecord>,
    profiles: HashMap<UserId, Profile>,
    contact_requests: Vec<ContactRequest>,
    next_id: u64,
    offline: bool,
    returned_id_limit: Option<usize>,
    insert_calls: usize,
    update_calls: usize,
}

/// A [`ReservationBackend`] (and friends) backed by in-memory tables.
///
/// Failure modes can be switched on to exercise degraded paths:
/// [`set_offline`](Self::set_offline) fails every call, and
/// [`limit_returned_ids`](Self::limit_returned_ids) accepts a whole batch but
/// reports ids for only the first rows.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tours(tours: Vec<Tour>) -> Self {
        let backend = Self::new();
        backend.lock().tours = tours;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a poisoned lock only means a test panicked mid-call; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_online(state: &State) -> Result<(), BackendError> {
        if state.offline {
            Err(BackendError::Request("backend unreachable".into()))
        } else {
            Ok(())
        }
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Report ids for at most `limit` rows of each inserted batch.
    pub fn limit_returned_ids(&self, limit: Option<usize>) {
        self.lock().returned_id_limit = limit;
    }

    /// Insert a reservation row directly, bypassing the client protocol.
    pub fn seed_reservation(&self, record: ReservationRecord) {
        self.lock().reservations.push(ReservationRecord {
            local_only: false,
            ..record
        });
    }

    pub fn seed_profile(&self, profile: Profile) {
        self.lock().profiles.insert(profile.id.clone(), profile);
    }

    /// Snapshot of every stored reservation.
    pub fn reservations(&self) -> Vec<ReservationRecord> {
        self.lock().reservations.clone()
    }

    pub fn contact_requests(&self) -> Vec<ContactRequest> {
        self.lock().contact_requests.clone()
    }

    /// Number of `insert_reservations` calls received.
    pub fn insert_calls(&self) -> usize {
        self.lock().insert_calls
    }

    /// Number of `update_status` and `set_status` calls received.
    pub fn update_calls(&self) -> usize {
        self.lock().update_calls
    }

    fn summary_for(tours: &[Tour], tour_id: &str) -> Option<TourSummary> {
        tours.iter().find(|t| t.id == tour_id).map(|t| TourSummary {
            id: t.id.clone(),
            title: t.title.clone(),
            cover_image: t.image_path.clone(),
            duration: Some(t.duration.clone()),
        })
    }

    fn with_summary(tours: &[Tour], record: &ReservationRecord) -> ReservationRecord {
        let mut record = record.clone();
        if let Some(summary) = Self::summary_for(tours, &record.tour_id) {
            record.tour = Some(summary);
        }
        record
    }
}

#[async_trait]
impl ReservationBackend for InMemoryBackend {
    async fn list_reservations(
        &self,
        user_id: &str,
    ) -> Result<Vec<ReservationRecord>, BackendError> {
        let state = self.lock();
        Self::check_online(&state)?;

        let mut rows: Vec<_> = state
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| Self::with_summary(&state.tours, r))
            .collect();
        rows.sort_by_key(|r| Reverse(r.effective_timestamp()));
        Ok(rows)
    }

    async fn insert_reservations(
        &self,
        rows: &[NewReservation],
    ) -> Result<Vec<InsertedRow>, BackendError> {
        let mut state = self.lock();
        state.insert_calls += 1;
        Self::check_online(&state)?;

        if let Some(bad) = rows.iter().find(|r| r.pax == 0) {
            return Err(BackendError::Request(format!(
                "pax must be at least 1 (tour {})",
                bad.tour_id
            )));
        }

        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut inserted = Vec::with_capacity(rows.len());

        for row in rows {
            state.next_id += 1;
            let id = format!("res-{}", state.next_id);

            let mut record = ReservationRecord::new(
                id.clone(),
                row.user_id.clone(),
                row.tour_id.clone(),
                row.date.clone(),
                row.pax,
            )
            .confirmed_remote()
            .with_status(row.status.clone())
            .with_created_at(created_at.clone());
            record.user_email = row.user_email.clone();

            state.reservations.push(record);
            inserted.push(InsertedRow::with_id(id));
        }

        if let Some(limit) = state.returned_id_limit {
            inserted.truncate(limit);
        }
        Ok(inserted)
    }

    async fn update_status(
        &self,
        id: &str,
        user_id: &str,
        status: ReservationStatus,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.update_calls += 1;
        Self::check_online(&state)?;

        let record = state
            .reservations
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        record.status = status;
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for InMemoryBackend {
    async fn list_all_reservations(&self) -> Result<Vec<ReservationRecord>, BackendError> {
        let state = self.lock();
        Self::check_online(&state)?;

        let mut rows: Vec<_> = state
            .reservations
            .iter()
            .map(|r| Self::with_summary(&state.tours, r))
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(rows)
    }

    async fn set_status(&self, id: &str, status: ReservationStatus) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.update_calls += 1;
        Self::check_online(&state)?;

        let record = state
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        record.status = status;
        Ok(())
    }
}

#[async_trait]
impl ProfileBackend for InMemoryBackend {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        let state = self.lock();
        Self::check_online(&state)?;
        Ok(state.profiles.get(user_id).cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;

        if state.profiles.contains_key(&profile.id) {
            return Err(BackendError::Request(format!(
                "profile already exists: {}",
                profile.id
            )));
        }
        state.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}

#[async_trait]
impl CatalogBackend for InMemoryBackend {
    async fn list_tours(&self) -> Result<Vec<Tour>, BackendError> {
        let state = self.lock();
        Self::check_online(&state)?;

        let mut tours = state.tours.clone();
        tours.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(tours)
    }

    async fn submit_contact(&self, request: &ContactRequest) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_online(&state)?;
        state.contact_requests.push(request.clone());
        Ok(())
    }
}
