//! LRU Index
//!
//! Least Recently Used ordering: reads and writes move a key to the front,
//! the victim is the back of the list.

use chrono::{DateTime, Utc};

use super::{EvictionIndex, OrderList};

/// Tracks access order for LRU eviction.
#[derive(Debug, Default)]
pub struct LruIndex {
    order: OrderList,
}

impl LruIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvictionIndex for LruIndex {
    fn on_insert(&mut self, key: &str, _expires_at: DateTime<Utc>) {
        self.order.push_front(key);
    }

    fn on_access(&mut self, key: &str) {
        self.order.move_to_front(key);
    }

    fn on_remove(&mut self, key: &str) {
        self.order.remove(key);
    }

    fn victim(&self) -> Option<&str> {
        self.order.back()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn filled(keys: &[&str]) -> LruIndex {
        let now = Utc::now();
        let mut lru = LruIndex::new();
        for key in keys {
            lru.on_insert(key, now);
        }
        lru
    }

    #[test]
    fn test_lru_oldest_insert_is_victim() {
        let lru = filled(&["key1", "key2", "key3"]);
        assert_eq!(lru.len(), 3);
        assert_eq!(lru.victim(), Some("key1"));
    }

    #[test]
    fn test_lru_access_moves_to_front() {
        let mut lru = filled(&["a", "b", "c"]);

        lru.on_access("a");
        assert_eq!(lru.victim(), Some("b"));

        lru.on_remove("b");
        assert_eq!(lru.victim(), Some("c"));
        lru.on_remove("c");
        assert_eq!(lru.victim(), Some("a"));
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = filled(&["a", "b", "c"]);

        // Front to back after these reads: b, c, a
        lru.on_access("a");
        lru.on_access("c");
        lru.on_access("b");

        let mut evicted = Vec::new();
        while let Some(key) = lru.victim().map(str::to_owned) {
            lru.on_remove(&key);
            evicted.push(key);
        }
        assert_eq!(evicted, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_lru_reinsert_refreshes_position() {
        let mut lru = filled(&["a", "b"]);
        lru.on_insert("a", Utc::now());

        assert_eq!(lru.len(), 2);
        assert_eq!(lru.victim(), Some("b"));
    }

    #[test]
    fn test_lru_unknown_keys_ignored() {
        let mut lru = filled(&["key1", "key2"]);
        lru.on_access("nonexistent");
        lru.on_remove("nonexistent");

        assert_eq!(lru.len(), 2);
        assert_eq!(lru.victim(), Some("key1"));
    }
}
