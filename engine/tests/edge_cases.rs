//! End-to-end tests for mccoy-engine
//!
//! These tests drive the public API the way a client host does: one storage
//! medium shared by the cart and the reservation store, a backend, and the
//! account view on top.

use chrono::{TimeZone, Utc};
use mccoy_engine::{
    checkout, merge, AccountView, CancelOutcome, Cart, CartItem, Error, FileStorage,
    InMemoryBackend, KeyValueStorage, LocalReservationStore, MemoryStorage, ReservationBackend,
    ReservationOutcome, ReservationRecord, Role, Session, SessionUser, UnavailableStorage,
    CART_KEY, RESERVATIONS_KEY,
};
use serde_json::json;
use std::rc::Rc;

fn session() -> Session {
    Session::with_role(SessionUser::new("u1").with_email("ana@example.com"), Role::Customer)
}

fn rafting(date: &str, pax: u32) -> CartItem {
    CartItem::new("rafting-extremo", "Rafting Extremo", 55.0, date, pax)
}

fn is_placeholder(id: &str) -> bool {
    let mut parts = id.splitn(3, '-');
    parts.next() == Some("local")
        && parts.next().is_some_and(|ts| ts.parse::<i64>().is_ok())
        && parts.next().is_some_and(|idx| idx.parse::<usize>().is_ok())
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn merge_scenario_remote_then_local() {
    let remote: Vec<ReservationRecord> = serde_json::from_value(json!([
        {"id": "r1", "date": "2024-03-01", "pax": 2, "status": "pending", "created_at": "2024-01-02", "localOnly": false}
    ]))
    .unwrap();
    let local: Vec<ReservationRecord> = serde_json::from_value(json!([
        {"id": "r1", "date": "2024-03-01", "pax": 2, "status": "pending"},
        {"id": "local-9", "user_id": "u1", "date": "2024-03-01", "pax": 2, "status": "pending", "created_at": "2024-01-01"}
    ]))
    .unwrap();

    let ids: Vec<_> = merge(&remote, &local, "u1").into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["r1", "local-9"]);
}

#[tokio::test]
async fn partial_checkout_buffers_one_placeholder() {
    let backend = InMemoryBackend::new();
    backend.limit_returned_ids(Some(1));

    let storage = Rc::new(MemoryStorage::new());
    let store = LocalReservationStore::new(Rc::clone(&storage));
    let mut cart = Cart::load(Rc::clone(&storage));
    cart.add(rafting("2024-03-01", 2)).unwrap();
    cart.add(rafting("2024-03-02", 1)).unwrap();

    let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
    let receipt = checkout(&backend, &store, &mut cart, &session(), now).await.unwrap();

    let pending: Vec<_> = store.load_all().into_iter().filter(|r| r.local_only).collect();
    assert_eq!(pending.len(), 1);
    assert!(is_placeholder(&pending[0].id), "{}", pending[0].id);
    assert_eq!(pending[0].id, format!("local-{}-1", now.timestamp_millis()));
    assert!(matches!(receipt.outcomes[1], ReservationOutcome::Pending(_)));

    assert!(cart.is_empty());
    // the cleared cart is what a reload sees
    assert!(Cart::load(Rc::clone(&storage)).is_empty());
}

#[tokio::test]
async fn cancelling_local_only_record_skips_backend() {
    let backend = InMemoryBackend::new();
    let store = LocalReservationStore::new(MemoryStorage::new());
    store.upsert_many(vec![
        ReservationRecord::new("local-1706745600000-0", "u1", "rafting-extremo", "2024-03-01", 2)
            .with_created_at("2024-02-01T00:00:00.000Z"),
    ]);

    let mut view = AccountView::open(&backend, &store, &session());
    view.refresh().await;
    assert_eq!(view.reservations().len(), 1);

    let outcome = view.cancel("local-1706745600000-0").await.unwrap();

    assert_eq!(outcome, CancelOutcome::RemovedLocal);
    assert_eq!(backend.update_calls(), 0);
    assert!(view.reservations().is_empty());
    assert!(store.load_all().is_empty());
}

#[tokio::test]
async fn full_round_trip_through_account_view() {
    let backend = InMemoryBackend::new();
    let storage = Rc::new(MemoryStorage::new());
    let store = LocalReservationStore::new(Rc::clone(&storage));
    let mut cart = Cart::load(Rc::clone(&storage));
    cart.add(rafting("2024-03-01", 2)).unwrap();

    let receipt = checkout(&backend, &store, &mut cart, &session(), Utc::now())
        .await
        .unwrap();
    let id = receipt.outcomes[0].id().to_string();

    let mut view = AccountView::open(&backend, &store, &session());
    view.refresh().await;
    assert_eq!(view.reservations().len(), 1);
    assert!(!view.reservations()[0].local_only);

    view.cancel(&id).await.unwrap();
    view.refresh().await;
    assert!(view.reservations().is_empty());
    assert!(store.get(&id).unwrap().is_cancelled());
}

// ============================================================================
// Degraded media
// ============================================================================

#[tokio::test]
async fn checkout_survives_unavailable_storage() {
    let backend = InMemoryBackend::new();
    let store = LocalReservationStore::new(UnavailableStorage);
    let mut cart = Cart::load(UnavailableStorage);
    cart.add(rafting("2024-03-01", 2)).unwrap();

    let receipt = checkout(&backend, &store, &mut cart, &session(), Utc::now())
        .await
        .unwrap();

    assert_eq!(receipt.confirmed_count(), 1);
    assert!(store.load_all().is_empty());
    assert_eq!(backend.list_reservations("u1").await.unwrap().len(), 1);
}

#[test]
fn corrupt_reservations_do_not_affect_cart() {
    let storage = MemoryStorage::new();
    storage.set_item(RESERVATIONS_KEY, "[{\"id\":").unwrap();
    storage
        .set_item(CART_KEY, &serde_json::to_string(&vec![rafting("2024-03-01", 2)]).unwrap())
        .unwrap();

    assert!(LocalReservationStore::new(&storage).load_all().is_empty());
    assert_eq!(Cart::load(&storage).len(), 1);
}

#[test]
fn file_storage_reload_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = LocalReservationStore::new(FileStorage::open(dir.path()).unwrap());
        store.upsert_many(vec![ReservationRecord::new("local-1-0", "u1", "t1", "2024-03-01", 2)]);
    }

    let store = LocalReservationStore::new(FileStorage::open(dir.path()).unwrap());
    let all = store.load_all();
    assert_eq!(all.len(), 1);
    assert!(all[0].local_only);
}

#[tokio::test]
async fn backend_failure_keeps_cart_for_retry() {
    let backend = InMemoryBackend::new();
    backend.set_offline(true);
    let storage = MemoryStorage::new();
    let store = LocalReservationStore::new(&storage);
    let mut cart = Cart::load(&storage);
    cart.add(rafting("2024-03-01", 2)).unwrap();

    let err = checkout(&backend, &store, &mut cart, &session(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Backend(_)));

    backend.set_offline(false);
    let receipt = checkout(&backend, &store, &mut cart, &session(), Utc::now())
        .await
        .unwrap();
    assert_eq!(receipt.confirmed_count(), 1);
}

// ============================================================================
// Unusual input
// ============================================================================

#[test]
fn unicode_and_special_ids() {
    let store = LocalReservationStore::new(MemoryStorage::new());
    let ids = ["reserva-ñandú", "🎉", "id with spaces", "a\"quote", ""];

    store.upsert_many(ids.iter().map(|id| ReservationRecord::new(*id, "u1", "t1", "2024-03-01", 1)));
    let stored: Vec<_> = store.load_all().into_iter().map(|r| r.id).collect();
    assert_eq!(stored, ids);

    store.remove_by_id("🎉");
    assert!(store.get("🎉").is_none());
    assert_eq!(store.load_all().len(), ids.len() - 1);
}

#[test]
fn unknown_status_is_shown_and_preserved() {
    let store = LocalReservationStore::new(MemoryStorage::new());
    store.upsert_many(vec![
        ReservationRecord::new("r1", "u1", "t1", "2024-03-01", 1).with_status("on_hold")
    ]);

    let merged = merge(&[], &store.load_all(), "u1");
    assert_eq!(merged[0].status.as_str(), "on_hold");
}

#[test]
fn many_records_stay_ordered() {
    let store = LocalReservationStore::new(MemoryStorage::new());
    let records: Vec<_> = (0..500)
        .map(|i| {
            ReservationRecord::new(format!("local-{}-0", i), "u1", "t1", "2024-03-01", 1)
                .with_created_at(format!("2024-01-01T00:{:02}:{:02}Z", i / 60, i % 60))
        })
        .collect();
    store.upsert_many(records);

    let merged = merge(&[], &store.load_all(), "u1");
    assert_eq!(merged.len(), 500);
    assert_eq!(merged[0].id, "local-499-0");
    assert_eq!(merged[499].id, "local-0-0");
}
