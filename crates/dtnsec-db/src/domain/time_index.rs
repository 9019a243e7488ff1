//! # Time Index
//!
//! In-memory ordered index over the time-indexed asymmetric key stores,
//! rebuilt from the persistent list on attach and mutated in lock-step with
//! every committed add/remove.
//!
//! One abstraction serves all three stores: peer public keys are keyed by
//! `(node_nbr, effective_time)`, the local node's own public and private
//! keys by `effective_time` alone.

use std::collections::BTreeMap;

/// Ordered map from a time-ordered key to the persistent element holding
/// the record.
///
/// Readers never observe an entry whose record is not committed: the service
/// inserts/removes entries only after the surrounding transaction commits.
#[derive(Debug, Clone, Default)]
pub struct TimeIndex<K: Ord + Copy, V: Copy> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord + Copy, V: Copy> TimeIndex<K, V> {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert an entry. Returns `false` (and leaves the index unchanged) if
    /// the slot is already occupied.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    /// Remove an entry, returning its value if present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    /// Exact-slot lookup.
    pub fn get_exact(&self, key: &K) -> Option<V> {
        self.entries.get(key).copied()
    }

    /// The entry with the largest key in `lower..=probe`, if any.
    ///
    /// This is the point-in-time retrieval discipline: with `lower` pinned
    /// to the earliest key of the owner and `probe` at the query time, the
    /// result is the record effective at the query time. A `lower` bound
    /// scoped to the owner keeps a neighboring owner's records from
    /// satisfying the query.
    pub fn latest_in_range(&self, lower: K, probe: K) -> Option<V> {
        if probe < lower {
            return None;
        }
        self.entries
            .range(lower..=probe)
            .next_back()
            .map(|(_, v)| *v)
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
