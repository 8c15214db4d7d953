//! Reservation Merger - combines the backend list with the local mirror.
//!
//! # Algorithm
//!
//! 1. Keep local records owned by the user that are not cancelled
//! 2. Keep remote records that are not cancelled
//! 3. Insert remote records first; they win on id collision
//! 4. Insert local records only when their id is not already present
//! 5. Sort newest first by effective timestamp (`created_at`, else `date`),
//!    stable so equal timestamps keep insertion order
//!
//! The merger owns no state; it only computes a view.

use crate::{ReservationId, ReservationRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// How local state may influence remote records on an id collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeStrategy {
    /// Remote always wins; local copies with a colliding id are ignored (default)
    #[default]
    RemoteWins,
    /// As `RemoteWins`, but a locally cancelled copy hides its remote twin.
    /// Covers a cancel the backend has accepted but a stale read still reports.
    HonorLocalCancellations,
}

/// Merge `remote` and `local` into the display list for `user_id`.
pub fn merge(
    remote: &[ReservationRecord],
    local: &[ReservationRecord],
    user_id: &str,
) -> Vec<ReservationRecord> {
    merge_with(MergeStrategy::RemoteWins, remote, local, user_id)
}

/// Merge with an explicit [`MergeStrategy`].
pub fn merge_with(
    strategy: MergeStrategy,
    remote: &[ReservationRecord],
    local: &[ReservationRecord],
    user_id: &str,
) -> Vec<ReservationRecord> {
    let locally_cancelled: HashSet<&str> = match strategy {
        MergeStrategy::RemoteWins => HashSet::new(),
        MergeStrategy::HonorLocalCancellations => local
            .iter()
            .filter(|r| r.user_id == user_id && r.is_cancelled())
            .map(|r| r.id.as_str())
            .collect(),
    };

    let mut view = MergedView::default();

    for record in remote.iter().filter(|r| !r.is_cancelled()) {
        if locally_cancelled.contains(record.id.as_str()) {
            continue;
        }
        view.set(record.clone());
    }

    for record in local
        .iter()
        .filter(|r| r.user_id == user_id && !r.is_cancelled())
    {
        if !view.contains(&record.id) {
            view.set(record.clone());
        }
    }

    let mut merged = view.into_records();
    // Vec::sort_by_key is stable; None sorts after every parseable timestamp
    merged.sort_by_key(|r| Reverse(r.effective_timestamp()));
    merged
}

/// Insertion-ordered map keyed by reservation id.
#[derive(Default)]
struct MergedView {
    records: Vec<ReservationRecord>,
    index: HashMap<ReservationId, usize>,
}

impl MergedView {
    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Insert, or replace in place when the id is already present.
    fn set(&mut self, record: ReservationRecord) {
        match self.index.get(&record.id) {
            Some(&i) => self.records[i] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    fn into_records(self) -> Vec<ReservationRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReservationStatus;

    fn remote(id: &str, created_at: &str) -> ReservationRecord {
        ReservationRecord::new(id, "u1", "t1", "2024-06-01", 2)
            .confirmed_remote()
            .with_created_at(created_at)
    }

    fn local(id: &str, user: &str, created_at: &str) -> ReservationRecord {
        ReservationRecord::new(id, user, "t1", "2024-06-01", 2).with_created_at(created_at)
    }

    fn ids(records: &[ReservationRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn remote_wins_scenario() {
        let remote = vec![ReservationRecord::new("r1", "", "t1", "2024-06-01", 2)
            .confirmed_remote()
            .with_created_at("2024-01-02")];
        let local = vec![
            ReservationRecord::new("r1", "u1", "t1", "2024-06-01", 4),
            local("local-9", "u1", "2024-01-01"),
        ];

        let merged = merge(&remote, &local, "u1");

        assert_eq!(ids(&merged), vec!["r1", "local-9"]);
        assert_eq!(merged[0].pax, 2, "remote copy is the one kept");
        assert!(!merged[0].local_only);
    }

    #[test]
    fn cancelled_records_are_hidden() {
        let remote = vec![
            remote("r1", "2024-01-02").with_status(ReservationStatus::Cancelled),
            remote("r2", "2024-01-03"),
        ];
        let local = vec![local("l1", "u1", "2024-01-04").with_status("cancelled")];

        let merged = merge(&remote, &local, "u1");
        assert_eq!(ids(&merged), vec!["r2"]);
    }

    #[test]
    fn other_users_local_records_are_ignored() {
        let local = vec![local("l1", "u2", "2024-01-04"), local("l2", "u1", "2024-01-03")];
        let merged = merge(&[], &local, "u1");
        assert_eq!(ids(&merged), vec!["l2"]);
    }

    #[test]
    fn local_copy_survives_remote_cancellation() {
        // cancelled remote rows are filtered before the collision check
        let remote = vec![remote("r1", "2024-01-02").with_status("cancelled")];
        let local = vec![local("r1", "u1", "2024-01-02")];

        let merged = merge(&remote, &local, "u1");
        assert_eq!(ids(&merged), vec!["r1"]);
        assert!(merged[0].local_only);
    }

    #[test]
    fn sorted_newest_first_with_date_fallback() {
        let remote = vec![remote("old", "2024-01-01T08:00:00Z"), remote("new", "2024-02-01")];
        let local = vec![ReservationRecord::new("mid", "u1", "t1", "2024-01-15", 1)];

        let merged = merge(&remote, &local, "u1");
        assert_eq!(ids(&merged), vec!["new", "mid", "old"]);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let remote = vec![remote("a", "2024-01-01"), remote("b", "2024-01-01")];
        let local = vec![local("c", "u1", "2024-01-01")];

        let merged = merge(&remote, &local, "u1");
        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
    }

    #[test]
    fn unparseable_timestamps_sort_last() {
        let remote = vec![remote("bad", "someday"), remote("good", "2020-01-01")];
        let merged = merge(&remote, &[], "u1");
        assert_eq!(ids(&merged), vec!["good", "bad"]);
    }

    #[test]
    fn duplicate_remote_ids_keep_first_position() {
        let mut second = remote("a", "2024-01-01");
        second.pax = 7;
        let remote = vec![remote("a", "2024-01-01"), remote("b", "2024-01-01"), second];

        let merged = merge(&remote, &[], "u1");
        assert_eq!(ids(&merged), vec!["a", "b"]);
        assert_eq!(merged[0].pax, 7);
    }

    #[test]
    fn duplicate_local_ids_keep_first_entry() {
        let first = ReservationRecord::new("local-1-0", "u1", "t1", "2024-01-01", 2);
        let mut second = first.clone();
        second.pax = 7;

        let merged = merge(&[], &[first, second], "u1");
        assert_eq!(ids(&merged), vec!["local-1-0"]);
        assert_eq!(merged[0].pax, 2);
    }

    #[test]
    fn honor_local_cancellations_hides_stale_remote() {
        let remote = vec![remote("r1", "2024-01-02"), remote("r2", "2024-01-01")];
        let local = vec![self::remote("r1", "2024-01-02").with_status("cancelled")];

        let default_view = merge(&remote, &local, "u1");
        assert_eq!(ids(&default_view), vec!["r1", "r2"]);

        let honoring = merge_with(
            MergeStrategy::HonorLocalCancellations,
            &remote,
            &local,
            "u1",
        );
        assert_eq!(ids(&honoring), vec!["r2"]);
    }

    #[test]
    fn strategy_default_is_remote_wins() {
        assert_eq!(MergeStrategy::default(), MergeStrategy::RemoteWins);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_record() -> impl Strategy<Value = ReservationRecord> {
            (
                prop::sample::select(vec!["a", "b", "c", "d", "local-1-0", "local-1-1"]),
                prop::sample::select(vec!["u1", "u2"]),
                prop::sample::select(vec!["pending", "confirmed", "cancelled", "on_hold"]),
                prop::option::of(prop::sample::select(vec![
                    "2024-01-01",
                    "2024-01-02T10:00:00Z",
                    "2024-02-01T00:00:00.000Z",
                    "garbage",
                ])),
                any::<bool>(),
                1u32..6,
            )
                .prop_map(|(id, user, status, created_at, local_only, pax)| {
                    let mut record = ReservationRecord::new(id, user, "t1", "2024-03-01", pax)
                        .with_status(status);
                    record.created_at = created_at.map(str::to_string);
                    record.local_only = local_only;
                    record
                })
        }

        proptest! {
            #[test]
            fn prop_merged_view_is_clean(
                remote in prop::collection::vec(arb_record(), 0..12),
                local in prop::collection::vec(arb_record(), 0..12),
            ) {
                let merged = merge(&remote, &local, "u1");

                // no cancelled records, no duplicate ids
                prop_assert!(merged.iter().all(|r| !r.is_cancelled()));
                let unique: HashSet<&str> = merged.iter().map(|r| r.id.as_str()).collect();
                prop_assert_eq!(unique.len(), merged.len());

                // newest first, unparseable last
                for pair in merged.windows(2) {
                    prop_assert!(Reverse(pair[0].effective_timestamp()) <= Reverse(pair[1].effective_timestamp()));
                }
            }

            #[test]
            fn prop_remote_always_wins(
                remote in prop::collection::vec(arb_record(), 0..12),
                local in prop::collection::vec(arb_record(), 0..12),
            ) {
                let merged = merge(&remote, &local, "u1");

                for kept in remote.iter().filter(|r| !r.is_cancelled()) {
                    let last = remote.iter().rev().find(|r| r.id == kept.id).unwrap();
                    if last.is_cancelled() {
                        continue;
                    }
                    let shown = merged.iter().find(|r| r.id == kept.id);
                    prop_assert_eq!(shown, Some(last));
                }
            }

            #[test]
            fn prop_foreign_local_records_never_shown(
                local in prop::collection::vec(arb_record(), 0..12),
            ) {
                let merged = merge(&[], &local, "u1");
                prop_assert!(merged.iter().all(|r| r.user_id == "u1"));
            }

            #[test]
            fn prop_merge_is_deterministic(
                remote in prop::collection::vec(arb_record(), 0..12),
                local in prop::collection::vec(arb_record(), 0..12),
            ) {
                prop_assert_eq!(merge(&remote, &local, "u1"), merge(&remote, &local, "u1"));
            }
        }
    }
}
