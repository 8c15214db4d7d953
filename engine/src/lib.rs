//! # McCoy Engine
//!
//! Client-side reservation core for McCoy Tours.
//!
//! The backend is the record of truth for reservations, but checkout and the
//! account view must keep working while it is degraded. This crate holds the
//! logic that makes that possible: a device-local reservation cache, a pure
//! merge of remote and local state, and the checkout/cancellation protocols
//! that keep the two consistent.
//!
//! ## Design Principles
//!
//! - **Injected state**: stores and the cart are explicit values over a
//!   [`KeyValueStorage`] medium, never ambient globals
//! - **Fail soft locally**: storage problems degrade to "empty" or "skip"
//! - **Fail loud remotely**: backend failures surface as [`Error`] and leave
//!   local state untouched
//! - **Deterministic view**: [`merge`] is a pure function of its inputs
//!
//! ## Core Concepts
//!
//! ### Local Reservation Store
//!
//! [`LocalReservationStore`] persists [`ReservationRecord`]s under one storage
//! key. It is both a write-ahead buffer for reservations the backend has not
//! confirmed (`local_only = true`) and an offline mirror.
//!
//! ### Reservation Merger
//!
//! [`merge`] combines the backend's list with the local buffer. Remote records
//! always win on id collision, cancelled records are hidden, and the result is
//! ordered newest first.
//!
//! ### Protocols
//!
//! - [`checkout()`] - batch insert with optimistic local buffering
//! - [`cancel_reservation`] - backend-first cancellation with mirror upkeep
//! - [`AccountView`] - the displayed list and its refresh/cancel lifecycle
//!
//! ## Quick Start
//!
//! ```rust
//! use mccoy_engine::{merge, LocalReservationStore, MemoryStorage, ReservationRecord};
//!
//! let store = LocalReservationStore::new(MemoryStorage::new());
//! store.upsert_many(vec![ReservationRecord::new(
//!     "local-1706745600000-0",
//!     "user-1",
//!     "rafting-extremo",
//!     "2024-03-01",
//!     2,
//! )]);
//!
//! let view = merge(&[], &store.load_all(), "user-1");
//! assert_eq!(view.len(), 1);
//! assert!(view[0].local_only);
//! ```

pub mod account;
pub mod admin;
pub mod backend;
pub mod cancel;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod local_store;
pub mod merge;
pub mod record;
pub mod session;
pub mod storage;

// Re-export main types at crate root
pub use account::AccountView;
pub use backend::{
    AdminBackend, BackendError, CatalogBackend, ContactRequest, InMemoryBackend, InsertedRow,
    NewReservation, Profile, ProfileBackend, ReservationBackend, Tour,
};
pub use cancel::{cancel_reservation, CancelOutcome};
pub use cart::{Cart, CartItem, CART_KEY};
pub use catalog::{load_tours, resolve_image, submit_contact, TourListing};
pub use checkout::{
    checkout, local_placeholder_id, reconcile_pending, CheckoutReceipt, ReservationOutcome,
};
pub use config::{CatalogConfig, ClientConfig};
pub use error::Error;
pub use local_store::{LocalReservationStore, RESERVATIONS_KEY};
pub use merge::{merge, merge_with, MergeStrategy};
pub use record::{ReservationPatch, ReservationRecord, ReservationStatus, TourSummary};
pub use session::{ensure_profile, AdminCapability, Role, Session, SessionUser};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError, UnavailableStorage};

/// Type aliases for clarity
pub type ReservationId = String;
pub type UserId = String;
pub type TourId = String;
