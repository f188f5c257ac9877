//! Entry sizing.
//!
//! Sizes are abstract units consistent with the engine's capacity, not a
//! byte-exact memory footprint.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Computes the size of an entry from its key and value.
pub struct Weigher<V>(Arc<dyn Fn(&str, &V) -> u64 + Send + Sync>);

impl<V> Weigher<V> {
    /// Wraps a custom sizing closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &V) -> u64 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Every entry costs one unit, so capacity is an entry count.
    pub fn unit() -> Self {
        Self::new(|_, _| 1)
    }

    pub fn weigh(&self, key: &str, value: &V) -> u64 {
        (self.0)(key, value)
    }
}

impl<V: AsRef<[u8]>> Weigher<V> {
    /// Payload length in bytes.
    pub fn bytes() -> Self {
        Self::new(|_, value: &V| value.as_ref().len() as u64)
    }
}

impl<V: Serialize> Weigher<V> {
    /// Length of the JSON encoding, an estimate for structured values.
    ///
    /// Values that fail to serialize weigh one unit.
    pub fn json() -> Self {
        Self::new(|_, value: &V| {
            serde_json::to_vec(value)
                .map(|encoded| encoded.len() as u64)
                .unwrap_or(1)
        })
    }
}

impl<V> Clone for Weigher<V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<V> Default for Weigher<V> {
    fn default() -> Self {
        Self::unit()
    }
}

impl<V> fmt::Debug for Weigher<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Weigher")
    }
}
