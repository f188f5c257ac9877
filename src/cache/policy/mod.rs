//! Eviction Policy Module
//!
//! Each policy keeps an incrementally maintained ordering index next to the
//! entry map, so picking a victim never rescans the cache.
//!
//! # Tie-breaking
//! - LRU / FIFO: strict lists, no ties.
//! - LFU: among equal access counts, the entry that has held that count the
//!   longest goes first.
//! - TTL: among equal expiry instants, the earlier write goes first.

mod fifo;
mod lfu;
mod list;
mod lru;
mod ttl;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

pub use fifo::FifoIndex;
pub use lfu::LfuIndex;
pub use list::OrderList;
pub use lru::LruIndex;
pub use ttl::TtlIndex;

// == Eviction Policy ==
/// Rule for choosing which entry to remove under capacity pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Smallest last access
    Lru,
    /// Smallest access count
    Lfu,
    /// Smallest creation time
    Fifo,
    /// Smallest expiry instant, expired or not
    Ttl,
}

impl EvictionPolicy {
    /// Builds an empty ordering index for this policy.
    pub fn new_index(self) -> Box<dyn EvictionIndex> {
        match self {
            EvictionPolicy::Lru => Box::new(LruIndex::new()),
            EvictionPolicy::Lfu => Box::new(LfuIndex::new()),
            EvictionPolicy::Fifo => Box::new(FifoIndex::new()),
            EvictionPolicy::Ttl => Box::new(TtlIndex::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EvictionPolicy::Lru => "lru",
            EvictionPolicy::Lfu => "lfu",
            EvictionPolicy::Fifo => "fifo",
            EvictionPolicy::Ttl => "ttl",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "lfu" => Ok(EvictionPolicy::Lfu),
            "fifo" => Ok(EvictionPolicy::Fifo),
            "ttl" => Ok(EvictionPolicy::Ttl),
            _ => Err(CacheError::UnknownPolicy(s.to_string())),
        }
    }
}

// == Eviction Index ==
/// Ordering structure consulted by the engine when it needs room.
///
/// The engine calls these hooks while holding its lock, so implementations
/// are plain `&mut self` data structures. Every resident key is inserted
/// exactly once; re-inserting a key replaces its previous position.
pub trait EvictionIndex: Send + fmt::Debug {
    /// A key was written (new or replacement).
    fn on_insert(&mut self, key: &str, expires_at: DateTime<Utc>);

    /// A key was read successfully.
    fn on_access(&mut self, key: &str);

    /// A key left the cache for any reason.
    fn on_remove(&mut self, key: &str);

    /// The next eviction candidate, without removing it.
    fn victim(&self) -> Option<&str>;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all tracking state.
    fn clear(&mut self);
}
