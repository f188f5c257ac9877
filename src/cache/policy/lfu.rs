//! LFU Index
//!
//! Frequency buckets: one recency list per access count, buckets ordered by
//! count. A read moves the key from bucket `n` to the front of bucket `n + 1`,
//! so the back of the lowest bucket is the key that has sat at the lowest
//! count the longest.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::{EvictionIndex, OrderList};

/// Evicts the least frequently read entry.
#[derive(Debug, Default)]
pub struct LfuIndex {
    counts: HashMap<String, u64>,
    buckets: BTreeMap<u64, OrderList>,
}

impl LfuIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn detach(&mut self, key: &str, count: u64) {
        if let Some(bucket) = self.buckets.get_mut(&count) {
            bucket.remove(key);
            if bucket.is_empty() {
                self.buckets.remove(&count);
            }
        }
    }

    fn attach(&mut self, key: &str, count: u64) {
        self.buckets.entry(count).or_default().push_front(key);
    }

    /// Current access count tracked for a key.
    pub fn count(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }
}

impl EvictionIndex for LfuIndex {
    // A write starts the key over at zero reads.
    fn on_insert(&mut self, key: &str, _expires_at: DateTime<Utc>) {
        if let Some(old) = self.counts.insert(key.to_string(), 0) {
            self.detach(key, old);
        }
        self.attach(key, 0);
    }

    fn on_access(&mut self, key: &str) {
        let Some(count) = self.counts.get_mut(key) else {
            return;
        };
        let old = *count;
        *count = old.saturating_add(1);
        let new = *count;

        self.detach(key, old);
        self.attach(key, new);
    }

    fn on_remove(&mut self, key: &str) {
        if let Some(count) = self.counts.remove(key) {
            self.detach(key, count);
        }
    }

    fn victim(&self) -> Option<&str> {
        self.buckets
            .first_key_value()
            .and_then(|(_, bucket)| bucket.back())
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn clear(&mut self) {
        self.counts.clear();
        self.buckets.clear();
    }
}
