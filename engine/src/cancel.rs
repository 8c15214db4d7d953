//! Cancellation Protocol.

use crate::{
    backend::ReservationBackend, error::Result, local_store::LocalReservationStore,
    storage::KeyValueStorage, ReservationPatch, ReservationRecord, ReservationStatus,
};

/// How a cancellation was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The record only existed locally and was deleted from the store
    RemovedLocal,
    /// The backend accepted the cancellation and the mirror was updated
    CancelledRemote,
}

/// Cancel `record` on behalf of `user_id`.
///
/// A `local_only` record is removed from the store without contacting the
/// backend. Anything else is cancelled on the backend first; if that fails
/// the error is returned and the store is not touched.
pub async fn cancel_reservation<B, S>(
    backend: &B,
    store: &LocalReservationStore<S>,
    user_id: &str,
    record: &ReservationRecord,
) -> Result<CancelOutcome>
where
    B: ReservationBackend + ?Sized,
    S: KeyValueStorage,
{
    if record.local_only {
        store.remove_by_id(&record.id);
        tracing::debug!(id = %record.id, "removed unconfirmed local reservation");
        return Ok(CancelOutcome::RemovedLocal);
    }

    if let Err(e) = backend
        .update_status(&record.id, user_id, ReservationStatus::Cancelled)
        .await
    {
        tracing::warn!(id = %record.id, %user_id, "cancellation failed: {}", e);
        return Err(e.into());
    }

    store.patch_by_id(&record.id, &ReservationPatch::status(ReservationStatus::Cancelled));
    tracing::info!(id = %record.id, %user_id, "reservation cancelled");
    Ok(CancelOutcome::CancelledRemote)
}
