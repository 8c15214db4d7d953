//! Local Reservation Store - the on-device reservation mirror.
//!
//! Holds reservations created while backend confirmation was uncertain
//! (`local_only = true`) alongside read-cache copies of confirmed ones. All
//! records live as one JSON array under a single storage key.
//!
//! Every operation is best-effort against the medium: an unavailable or
//! corrupt medium reads as empty and a failed write is skipped. Failures are
//! logged, never returned.

use crate::{
    storage::KeyValueStorage, ReservationId, ReservationPatch, ReservationRecord,
};
use std::collections::HashMap;

/// Storage key holding the reservation mirror.
pub const RESERVATIONS_KEY: &str = "mccoy_reservations";

/// Durable, synchronous reservation mirror over a [`KeyValueStorage`].
#[derive(Debug)]
pub struct LocalReservationStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> LocalReservationStore<S> {
    /// Create a store using the default [`RESERVATIONS_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, RESERVATIONS_KEY)
    }

    /// Create a store persisting under a custom key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The underlying medium.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> Vec<ReservationRecord> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, "reservation storage unreadable: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(key = %self.key, "discarding malformed reservation cache: {}", e);
                Vec::new()
            }
        }
    }

    fn write(&self, records: &[ReservationRecord]) {
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = %self.key, "failed to encode reservation cache: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set_item(&self.key, &json) {
            tracing::warn!(key = %self.key, records = records.len(), "reservation cache write skipped: {}", e);
        }
    }

    /// All persisted records; empty if the medium is missing or unparseable.
    pub fn load_all(&self) -> Vec<ReservationRecord> {
        self.read()
    }

    /// Look up one record by id.
    pub fn get(&self, id: &str) -> Option<ReservationRecord> {
        self.read().into_iter().find(|r| r.id == id)
    }

    /// Insert or overwrite records by id.
    ///
    /// Existing ids keep their position; new ids are appended in input order.
    /// When the input repeats an id, the last occurrence wins.
    pub fn upsert_many(&self, records: impl IntoIterator<Item = ReservationRecord>) {
        let incoming: Vec<ReservationRecord> = records.into_iter().collect();
        if incoming.is_empty() {
            return;
        }

        let mut merged = self.read();
        let mut index: HashMap<ReservationId, usize> = merged
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        for record in incoming {
            match index.get(&record.id) {
                Some(&i) => merged[i] = record,
                None => {
                    index.insert(record.id.clone(), merged.len());
                    merged.push(record);
                }
            }
        }

        tracing::debug!(key = %self.key, total = merged.len(), "upserted reservation records");
        self.write(&merged);
    }

    /// Merge `patch` into the record with `id`, if present.
    ///
    /// Returns the full collection after the change (unchanged when the id is
    /// unknown).
    pub fn patch_by_id(&self, id: &str, patch: &ReservationPatch) -> Vec<ReservationRecord> {
        let mut records = self.read();

        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            record.apply(patch);
            self.write(&records);
        }

        records
    }

    /// Delete the record with `id`, if present. Returns the resulting collection.
    pub fn remove_by_id(&self, id: &str) -> Vec<ReservationRecord> {
        let mut records = self.read();
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() != before {
            self.write(&records);
        }

        records
    }

    /// Re-key a placeholder record once the backend has assigned it an id.
    ///
    /// The record moves to `server_id` with `local_only = false`. If a record
    /// with `server_id` is already present the placeholder is dropped instead.
    pub fn promote(&self, local_id: &str, server_id: &str) -> Vec<ReservationRecord> {
        let mut records = self.read();

        let Some(pos) = records.iter().position(|r| r.id == local_id) else {
            return records;
        };

        if records.iter().any(|r| r.id == server_id) {
            records.remove(pos);
        } else {
            let record = &mut records[pos];
            record.id = server_id.to_string();
            record.local_only = false;
        }

        tracing::debug!(%local_id, %server_id, "promoted local reservation");
        self.write(&records);
        records
    }
}
