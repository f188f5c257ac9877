//! Size Accounting Module
//!
//! Running total of admitted entry sizes against the configured capacity.

use serde::Serialize;

// == Size Accountant ==
/// Tracks `current = Σ size` of resident entries.
///
/// Only mutated under the engine lock, so `current` always matches the sum
/// of resident entry sizes whenever it is observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeAccountant {
    current: u64,
    capacity: u64,
}

impl SizeAccountant {
    pub fn new(capacity: u64) -> Self {
        Self {
            current: 0,
            capacity,
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Whether `size` more units fit without eviction.
    pub fn fits(&self, size: u64) -> bool {
        self.current.saturating_add(size) <= self.capacity
    }

    // == Admit ==
    pub fn admit(&mut self, size: u64) {
        self.current = self.current.saturating_add(size);
    }

    // == Release ==
    pub fn release(&mut self, size: u64) {
        debug_assert!(size <= self.current, "releasing more than was admitted");
        self.current = self.current.saturating_sub(size);
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}
