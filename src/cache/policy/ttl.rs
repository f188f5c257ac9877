//! TTL Index
//!
//! Ordered set keyed by `(expires_at, write sequence)`: the first element is
//! the entry closest to expiring, expired or not.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use super::EvictionIndex;

type Slot = (DateTime<Utc>, u64);

/// Evicts the entry with the earliest expiry.
#[derive(Debug, Default)]
pub struct TtlIndex {
    order: BTreeSet<(DateTime<Utc>, u64, String)>,
    slots: HashMap<String, Slot>,
    next_seq: u64,
}

impl TtlIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvictionIndex for TtlIndex {
    fn on_insert(&mut self, key: &str, expires_at: DateTime<Utc>) {
        self.on_remove(key);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert((expires_at, seq, key.to_string()));
        self.slots.insert(key.to_string(), (expires_at, seq));
    }

    // Reads never change expiry.
    fn on_access(&mut self, _key: &str) {}

    fn on_remove(&mut self, key: &str) {
        if let Some((expires_at, seq)) = self.slots.remove(key) {
            self.order.remove(&(expires_at, seq, key.to_string()));
        }
    }

    fn victim(&self) -> Option<&str> {
        self.order.first().map(|(_, _, key)| key.as_str())
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn clear(&mut self) {
        self.order.clear();
        self.slots.clear();
    }
}
