//! Admin reservation management. Every operation requires an [`AdminCapability`].

use crate::{
    backend::AdminBackend, error::Result, session::AdminCapability, ReservationRecord,
    ReservationStatus,
};

/// Every reservation, earliest tour date first.
pub async fn list_reservations<B>(
    cap: &AdminCapability,
    backend: &B,
) -> Result<Vec<ReservationRecord>>
where
    B: AdminBackend + ?Sized,
{
    let rows = backend.list_all_reservations().await?;
    tracing::debug!(admin = cap.user_id(), count = rows.len(), "loaded all reservations");
    Ok(rows)
}

/// Change a reservation's status on the backend, then in `rows` if it is
/// listed there.
///
/// On failure `rows` is left as it was.
pub async fn update_status<B>(
    cap: &AdminCapability,
    backend: &B,
    rows: &mut [ReservationRecord],
    id: &str,
    status: ReservationStatus,
) -> Result<()>
where
    B: AdminBackend + ?Sized,
{
    backend.set_status(id, status.clone()).await?;
    tracing::info!(admin = cap.user_id(), %id, %status, "reservation status changed");

    if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
        row.status = status;
    }
    Ok(())
}

/// Group rows by status for display.
///
/// The three known statuses always come first, in lifecycle order, even when
/// empty. Unknown statuses follow in order of first appearance.
pub fn group_by_status(
    rows: &[ReservationRecord],
) -> Vec<(ReservationStatus, Vec<ReservationRecord>)> {
    let mut groups: Vec<(ReservationStatus, Vec<ReservationRecord>)> = ReservationStatus::KNOWN
        .iter()
        .map(|s| (s.clone(), Vec::new()))
        .collect();

    for row in rows {
        match groups.iter_mut().find(|(status, _)| *status == row.status) {
            Some((_, members)) => members.push(row.clone()),
            None => groups.push((row.status.clone(), vec![row.clone()])),
        }
    }

    groups
}
