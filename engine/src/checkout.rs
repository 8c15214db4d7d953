//! Checkout Reconciliation Protocol.
//!
//! Turns the cart into reservation rows with a single batched insert, then
//! buffers an equivalent record for every line item in the local store. Line
//! items the backend returned an id for are stored as confirmed; the rest get
//! a `local-<ms>-<index>` placeholder and stay `local_only` until the user
//! cancels them or they are promoted.
//!
//! Nothing is written locally and the cart is kept when the backend rejects
//! the batch or accepts it without returning any row.

use crate::{
    backend::{NewReservation, ReservationBackend},
    cart::Cart,
    error::Result,
    local_store::LocalReservationStore,
    record::parse_timestamp,
    session::Session,
    storage::KeyValueStorage,
    Error, ReservationId, ReservationRecord, ReservationStatus, TourSummary,
};
use chrono::{DateTime, SecondsFormat, Utc};

/// What became of one cart line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    /// The backend returned this id for the row
    Confirmed(ReservationId),
    /// Accepted but unconfirmed; stored under a local placeholder id
    Pending(ReservationId),
}

impl ReservationOutcome {
    pub fn id(&self) -> &str {
        match self {
            ReservationOutcome::Confirmed(id) | ReservationOutcome::Pending(id) => id,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, ReservationOutcome::Confirmed(_))
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// One outcome per cart line item, in cart order
    pub outcomes: Vec<ReservationOutcome>,
    /// The records written to the local store
    pub records: Vec<ReservationRecord>,
}

impl CheckoutReceipt {
    pub fn confirmed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_confirmed()).count()
    }

    pub fn pending_count(&self) -> usize {
        self.outcomes.len() - self.confirmed_count()
    }
}

/// Placeholder id for line item `index` of a checkout at `now_ms`.
pub fn local_placeholder_id(now_ms: i64, index: usize) -> ReservationId {
    format!("local-{}-{}", now_ms, index)
}

/// Run checkout for the session's user.
///
/// `now` stamps `created_at` on every record and seeds placeholder ids.
pub async fn checkout<B, S, C>(
    backend: &B,
    store: &LocalReservationStore<S>,
    cart: &mut Cart<C>,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<CheckoutReceipt>
where
    B: ReservationBackend + ?Sized,
    S: KeyValueStorage,
    C: KeyValueStorage,
{
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }

    let rows: Vec<NewReservation> = cart
        .items()
        .iter()
        .map(|item| NewReservation {
            user_id: session.user_id().to_string(),
            user_email: session.email().map(str::to_string),
            tour_id: item.tour_id.clone(),
            date: item.date.clone(),
            pax: item.pax,
            status: ReservationStatus::Pending,
            comments: None,
        })
        .collect();

    let inserted = match backend.insert_reservations(&rows).await {
        Ok(inserted) => inserted,
        Err(e) => {
            tracing::warn!(user_id = session.user_id(), items = rows.len(), "checkout rejected: {}", e);
            return Err(e.into());
        }
    };

    if inserted.is_empty() {
        tracing::warn!(user_id = session.user_id(), items = rows.len(), "checkout returned no rows");
        return Err(Error::Unconfirmed);
    }

    let now_ms = now.timestamp_millis();
    let created_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut outcomes = Vec::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());

    for (idx, item) in cart.items().iter().enumerate() {
        let returned_id = inserted.get(idx).and_then(|row| row.id.clone());
        let outcome = match returned_id {
            Some(id) => ReservationOutcome::Confirmed(id),
            None => ReservationOutcome::Pending(local_placeholder_id(now_ms, idx)),
        };

        let mut record = ReservationRecord::new(
            outcome.id(),
            session.user_id(),
            item.tour_id.clone(),
            item.date.clone(),
            item.pax,
        )
        .with_created_at(created_at.clone())
        .with_tour(TourSummary::new(item.tour_id.clone(), item.title.clone()));
        record.user_email = session.email().map(str::to_string);
        record.local_only = !outcome.is_confirmed();

        outcomes.push(outcome);
        records.push(record);
    }

    store.upsert_many(records.iter().cloned());
    cart.clear();

    let receipt = CheckoutReceipt { outcomes, records };
    tracing::info!(
        user_id = session.user_id(),
        confirmed = receipt.confirmed_count(),
        pending = receipt.pending_count(),
        "checkout complete"
    );

    Ok(receipt)
}

/// Allowed lag of a server `created_at` behind the device clock.
const CLOCK_SKEW_MS: i64 = 60_000;

/// When the placeholder's checkout happened: the `<ms>` of a
/// `local-<ms>-<index>` id, else its `created_at`.
fn checkout_timestamp(record: &ReservationRecord) -> Option<i64> {
    record
        .id
        .strip_prefix("local-")
        .and_then(|rest| rest.split('-').next())
        .and_then(|ms| ms.parse::<i64>().ok())
        .or_else(|| record.created_at.as_deref().and_then(parse_timestamp))
}

/// Promote placeholders the backend has since confirmed.
///
/// A `local_only` record with a placeholder id is matched to a `remote` row
/// with the same owner, tour, date and party size whose id the store does not
/// hold yet and whose `created_at` is no earlier than the placeholder's
/// checkout, allowing one minute of clock skew. Placeholders or rows without a usable
/// timestamp are never matched. Each remote row is used at most once. Returns
/// the `(local_id, server_id)` pairs that were promoted.
pub fn reconcile_pending<S>(
    store: &LocalReservationStore<S>,
    remote: &[ReservationRecord],
) -> Vec<(ReservationId, ReservationId)>
where
    S: KeyValueStorage,
{
    let local = store.load_all();
    let mut claimed: Vec<&str> = local.iter().map(|r| r.id.as_str()).collect();
    let mut pairs = Vec::new();

    for pending in local.iter().filter(|r| r.local_only && r.id.starts_with("local-")) {
        let Some(checked_out_at) = checkout_timestamp(pending) else {
            continue;
        };

        let candidate = remote.iter().find(|r| {
            r.user_id == pending.user_id
                && r.tour_id == pending.tour_id
                && r.date == pending.date
                && r.pax == pending.pax
                && !claimed.contains(&r.id.as_str())
                && r
                    .created_at
                    .as_deref()
                    .and_then(parse_timestamp)
                    .is_some_and(|created| created >= checked_out_at - CLOCK_SKEW_MS)
        });

        if let Some(found) = candidate {
            claimed.push(found.id.as_str());
            pairs.push((pending.id.clone(), found.id.clone()));
        }
    }

    for (local_id, server_id) in &pairs {
        store.promote(local_id, server_id);
    }
    pairs
}
