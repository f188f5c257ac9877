//! Cache Module
//!
//! Provides the in-process cache engine: TTL expiry, size-based admission
//! and LRU / LFU / FIFO / TTL eviction.

mod engine;
mod entry;
mod key;
mod policy;
mod size;
mod stats;
mod weigher;


// Re-export public types
pub use engine::CacheEngine;
pub use entry::CacheEntry;
pub use key::{generate_key, KeyPattern};
pub use policy::{
    EvictionIndex, EvictionPolicy, FifoIndex, LfuIndex, LruIndex, OrderList, TtlIndex,
};
pub use size::SizeAccountant;
pub use stats::{hit_rate, CacheStats, StatsCounters};
pub use weigher::Weigher;
