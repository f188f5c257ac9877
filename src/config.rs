//! Configuration Module
//!
//! Handles loading and validating cache engine configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::EvictionPolicy;
use crate::error::{CacheError, Result};

/// Cache engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Total size budget, in the units produced by the engine's weigher
    pub capacity: u64,
    /// Eviction policy, fixed for the engine's lifetime
    pub policy: EvictionPolicy,
    /// TTL applied to entries written without an explicit TTL
    pub default_ttl: Duration,
    /// Interval between background expiry sweeps
    pub cleanup_interval: Duration,
    /// Interval between warm-loader refreshes
    pub warm_refresh_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Size budget in weigher units (default: 1000)
    /// - `CACHE_POLICY` - One of `lru`, `lfu`, `fifo`, `ttl` (default: lru)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `CACHE_WARM_INTERVAL` - Warm refresh frequency in seconds (default: 300)
    ///
    /// Unparsable numbers fall back to their defaults. An unknown policy name
    /// is an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let policy = match env::var("CACHE_POLICY") {
            Ok(name) => name.parse()?,
            Err(_) => defaults.policy,
        };

        Ok(Self {
            capacity: env_number("CACHE_CAPACITY").unwrap_or(defaults.capacity),
            policy,
            default_ttl: env_number("CACHE_DEFAULT_TTL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.default_ttl),
            cleanup_interval: env_number("CACHE_CLEANUP_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            warm_refresh_interval: env_number("CACHE_WARM_INTERVAL")
                .map(Duration::from_secs)
                .unwrap_or(defaults.warm_refresh_interval),
        })
    }

    // == Validate ==
    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup interval must be greater than zero".to_string(),
            ));
        }
        if self.warm_refresh_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "warm refresh interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_number(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            policy: EvictionPolicy::Lru,
            default_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
            warm_refresh_interval: Duration::from_secs(300),
        }
    }
}
