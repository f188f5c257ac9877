//! Adaptive Cache - An in-process cache engine
//!
//! Size-bounded caching with pluggable eviction (LRU, LFU, FIFO, TTL),
//! lazy and swept expiry, usage statistics and an optional warm loader.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{generate_key, CacheEngine, CacheStats, EvictionPolicy, Weigher};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::WarmCacheLoader;
