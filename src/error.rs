//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// A cache miss is not an error; lookups report it as `None`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A single entry is larger than the whole cache
    #[error("Entry '{key}' of size {size} exceeds cache capacity {capacity}")]
    EntryTooLarge {
        key: String,
        size: u64,
        capacity: u64,
    },

    /// Construction-time misconfiguration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Policy name that does not map to a known eviction policy
    #[error("Unknown eviction policy: {0}")]
    UnknownPolicy(String),

    /// The background sweeper thread could not be started
    #[error("Failed to start expiry sweeper: {0}")]
    SweeperSpawn(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
