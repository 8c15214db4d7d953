//! The account page's reservation list.
//!
//! [`AccountView`] holds what is on screen: the last remote list, the local
//! mirror as of the last read, and their merge. A failed refresh keeps local
//! records visible and exposes a displayable error instead.

use crate::{
    backend::ReservationBackend,
    cancel::{cancel_reservation, CancelOutcome},
    checkout::reconcile_pending,
    error::Result,
    local_store::LocalReservationStore,
    merge::{merge_with, MergeStrategy},
    session::Session,
    storage::KeyValueStorage,
    Error, ReservationRecord, UserId,
};

/// Displayed reservations for one user.
pub struct AccountView<'a, B: ?Sized, S> {
    backend: &'a B,
    store: &'a LocalReservationStore<S>,
    user_id: UserId,
    strategy: MergeStrategy,
    remote: Vec<ReservationRecord>,
    reservations: Vec<ReservationRecord>,
    error: Option<String>,
}

impl<'a, B, S> AccountView<'a, B, S>
where
    B: ReservationBackend + ?Sized,
    S: KeyValueStorage,
{
    /// Open the view with whatever the local store holds. No backend call is made.
    pub fn open(backend: &'a B, store: &'a LocalReservationStore<S>, session: &Session) -> Self {
        let mut view = Self {
            backend,
            store,
            user_id: session.user_id().to_string(),
            strategy: MergeStrategy::default(),
            remote: Vec::new(),
            reservations: Vec::new(),
            error: None,
        };
        view.recompute();
        view
    }

    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self.recompute();
        self
    }

    /// The merged list, newest first.
    pub fn reservations(&self) -> &[ReservationRecord] {
        &self.reservations
    }

    /// The error from the last failed refresh or cancel, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Fetch the remote list and re-merge with the local store.
    ///
    /// On failure the remote list is cleared, local records stay visible and
    /// the error is kept for display.
    pub async fn refresh(&mut self) {
        match self.backend.list_reservations(&self.user_id).await {
            Ok(remote) => {
                let promoted = reconcile_pending(self.store, &remote);
                if !promoted.is_empty() {
                    tracing::info!(user_id = %self.user_id, count = promoted.len(), "promoted pending reservations");
                }
                self.remote = remote;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, "failed to load reservations: {}", e);
                self.remote.clear();
                self.error = Some(e.to_string());
            }
        }
        self.recompute();
    }

    /// Cancel the displayed reservation with `id`.
    ///
    /// On success the record leaves the displayed list. On failure nothing
    /// changes except the displayed error.
    pub async fn cancel(&mut self, id: &str) -> Result<CancelOutcome> {
        let record = self
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::ReservationNotFound(id.to_string()))?;

        match cancel_reservation(self.backend, self.store, &self.user_id, &record).await {
            Ok(outcome) => {
                self.reservations.retain(|r| r.id != id);
                self.remote.retain(|r| r.id != id);
                self.error = None;
                Ok(outcome)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn recompute(&mut self) {
        let local = self.store.load_all();
        self.reservations = merge_with(self.strategy, &self.remote, &local, &self.user_id);
    }
}
