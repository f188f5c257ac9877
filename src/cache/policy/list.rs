//! Arena-backed doubly linked list of keys.
//!
//! Shared ordering structure for the recency (LRU), insertion (FIFO) and
//! per-frequency (LFU) indexes. Every operation is O(1).

use std::collections::HashMap;

use generational_arena::{Arena, Index};

#[derive(Debug)]
struct Node {
    key: String,
    next: Option<Index>,
    prev: Option<Index>,
}

// == Order List ==
/// Keys ordered from front (newest) to back (oldest).
#[derive(Debug, Default)]
pub struct OrderList {
    nodes: Arena<Node>,
    lookup: HashMap<String, Index>,
    head: Option<Index>,
    tail: Option<Index>,
}

impl OrderList {
    pub fn new() -> Self {
        Self::default()
    }

    // Detaches a node from its neighbours; arena and lookup are left alone.
    fn unlink(&mut self, index: Index) {
        let (prev, next) = {
            let node = &self.nodes[index];
            (node.prev, node.next)
        };

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_front(&mut self, index: Index) {
        let old_head = self.head;
        self.nodes[index].prev = None;
        self.nodes[index].next = old_head;
        self.head = Some(index);

        if let Some(old_head) = old_head {
            self.nodes[old_head].prev = Some(index);
        }
        if self.tail.is_none() {
            self.tail = Some(index);
        }
    }

    // == Push Front ==
    /// Inserts a key as the newest element, moving it if already present.
    pub fn push_front(&mut self, key: &str) {
        if self.lookup.contains_key(key) {
            self.move_to_front(key);
            return;
        }
        let index = self.nodes.insert(Node {
            key: key.to_string(),
            next: None,
            prev: None,
        });
        self.lookup.insert(key.to_string(), index);
        self.link_front(index);
    }

    // == Move To Front ==
    /// Marks a key as newest. Unknown keys are ignored.
    pub fn move_to_front(&mut self, key: &str) {
        if let Some(&index) = self.lookup.get(key) {
            if self.head != Some(index) {
                self.unlink(index);
                self.link_front(index);
            }
        }
    }

    // == Remove ==
    /// Removes a key, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.lookup.remove(key) {
            Some(index) => {
                self.unlink(index);
                self.nodes.remove(index);
                true
            }
            None => false,
        }
    }

    /// The oldest key.
    pub fn back(&self) -> Option<&str> {
        self.tail.map(|index| self.nodes[index].key.as_str())
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.lookup.clear();
        self.head = None;
        self.tail = None;
    }

    // Keys from front to back.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut current = self.head;
        while let Some(index) = current {
            keys.push(self.nodes[index].key.clone());
            current = self.nodes[index].next;
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = OrderList::new();
        list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        assert_eq!(list.keys(), vec!["c", "b", "a"]);
        assert_eq!(list.back(), Some("a"));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_push_existing_key_moves_it() {
        let mut list = OrderList::new();
        list.push_front("a");
        list.push_front("b");
        list.push_front("a");

        assert_eq!(list.len(), 2);
        assert_eq!(list.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_move_to_front() {
        let mut list = OrderList::new();
        list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        list.move_to_front("a");
        assert_eq!(list.back(), Some("b"));

        // Head stays put
        list.move_to_front("a");
        assert_eq!(list.keys(), vec!["a", "c", "b"]);

        list.move_to_front("missing");
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut list = OrderList::new();
        for key in ["a", "b", "c", "d"] {
            list.push_front(key);
        }

        assert!(list.remove("c"));
        assert_eq!(list.keys(), vec!["d", "b", "a"]);
        assert!(list.remove("d"));
        assert_eq!(list.keys(), vec!["b", "a"]);
        assert!(list.remove("a"));
        assert_eq!(list.keys(), vec!["b"]);
        assert_eq!(list.back(), Some("b"));

        assert!(!list.remove("a"));
        assert!(list.remove("b"));
        assert!(list.is_empty());
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_clear() {
        let mut list = OrderList::new();
        list.push_front("a");
        list.push_front("b");
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.back(), None);

        list.push_front("c");
        assert_eq!(list.keys(), vec!["c"]);
    }
}
