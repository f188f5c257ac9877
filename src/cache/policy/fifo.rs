//! FIFO Index
//!
//! Insertion order only; reads never reorder.

use chrono::{DateTime, Utc};

use super::{EvictionIndex, OrderList};

/// Evicts the entry written first.
#[derive(Debug, Default)]
pub struct FifoIndex {
    queue: OrderList,
}

impl FifoIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvictionIndex for FifoIndex {
    // A replacement write counts as a fresh insertion.
    fn on_insert(&mut self, key: &str, _expires_at: DateTime<Utc>) {
        self.queue.push_front(key);
    }

    fn on_access(&mut self, _key: &str) {}

    fn on_remove(&mut self, key: &str) {
        self.queue.remove(key);
    }

    fn victim(&self) -> Option<&str> {
        self.queue.back()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
    }
}
