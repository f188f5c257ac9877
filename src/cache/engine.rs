//! Cache Engine Module
//!
//! Main cache engine: entry map, size accounting, eviction index and
//! statistics behind one lock, plus the expiry sweeper tied to its lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::key::KeyPattern;
use crate::cache::{
    CacheEntry, CacheStats, EvictionIndex, EvictionPolicy, SizeAccountant, StatsCounters, Weigher,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::ExpirySweeper;

// == Cache State ==
/// Everything guarded by the engine lock.
#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    index: Box<dyn EvictionIndex>,
    size: SizeAccountant,
    stats: StatsCounters,
}

impl<V> CacheState<V> {
    fn new(capacity: u64, policy: EvictionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            index: policy.new_index(),
            size: SizeAccountant::new(capacity),
            stats: StatsCounters::new(),
        }
    }

    // Removal shared by every path: delete, eviction, expiry, invalidation.
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        self.index.on_remove(key);
        let entry = self.entries.remove(key)?;
        self.size.release(entry.size);
        Some(entry)
    }

    // Bounded: every iteration removes one tracked key, and the loop stops
    // once the index runs dry. A victim already past its expiry counts as an
    // expiration, not an eviction.
    fn make_room(&mut self, size: u64, now: DateTime<Utc>) -> u64 {
        let mut evicted = 0;
        while !self.size.fits(size) {
            let Some(victim) = self.index.victim().map(str::to_owned) else {
                break;
            };
            match self.remove_entry(&victim) {
                Some(entry) if entry.is_expired_at(now) => self.stats.record_expiration(),
                Some(_) => {
                    self.stats.record_eviction();
                    evicted += 1;
                }
                None => {}
            }
        }
        evicted
    }

    fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
            self.stats.record_expiration();
        }
        expired.len()
    }
}

// == Shared ==
#[derive(Debug)]
struct Shared<V> {
    state: Mutex<CacheState<V>>,
    weigher: Weigher<V>,
    policy: EvictionPolicy,
    capacity: u64,
    default_ttl: Duration,
}

// == Cache Engine ==
/// Thread-safe cache handle; clones share the same cache.
///
/// Every public operation runs inside one exclusive critical section, so a
/// caller always observes its own writes. The expiry sweeper stops when the
/// last handle is dropped or [`CacheEngine::shutdown`] is called.
#[derive(Debug)]
pub struct CacheEngine<V> {
    shared: Arc<Shared<V>>,
    sweeper: Arc<ExpirySweeper>,
}

impl<V> Clone for CacheEngine<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            sweeper: Arc::clone(&self.sweeper),
        }
    }
}

impl<V> CacheEngine<V>
where
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates an engine where every entry costs one unit of `capacity`.
    ///
    /// # Arguments
    /// * `capacity` - Size budget, must be non-zero
    /// * `policy` - Eviction policy, fixed for the engine's lifetime
    /// * `default_ttl` - TTL for writes that do not pass one
    pub fn new(capacity: u64, policy: EvictionPolicy, default_ttl: Duration) -> Result<Self> {
        let config = CacheConfig {
            capacity,
            policy,
            default_ttl,
            ..CacheConfig::default()
        };
        Self::from_config(&config, Weigher::unit())
    }

    /// Creates an engine from a full configuration and a sizing function.
    ///
    /// Validates the configuration and starts the expiry sweeper.
    pub fn from_config(config: &CacheConfig, weigher: Weigher<V>) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared {
            state: Mutex::new(CacheState::new(config.capacity, config.policy)),
            weigher,
            policy: config.policy,
            capacity: config.capacity,
            default_ttl: config.default_ttl,
        });

        let weak: Weak<Shared<V>> = Arc::downgrade(&shared);
        let sweeper = ExpirySweeper::spawn(config.cleanup_interval, move || {
            weak.upgrade()
                .map(|shared| shared.state.lock().purge_expired())
                .unwrap_or(0)
        })?;

        debug!(
            capacity = config.capacity,
            policy = %config.policy,
            "cache engine created"
        );

        Ok(Self {
            shared,
            sweeper: Arc::new(sweeper),
        })
    }

    // == Set ==
    /// Stores a value, evicting per policy until it fits.
    ///
    /// Replacing an existing key releases its old size first. An entry larger
    /// than the whole capacity is rejected and the cache is left untouched.
    /// Victims removed to make room count as evictions, except those already
    /// expired, which count as expirations.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the default TTL if None)
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Result<()> {
        let key = key.into();
        let size = self.shared.weigher.weigh(&key, &value);
        if size > self.shared.capacity {
            warn!(
                key = %key,
                size,
                capacity = self.shared.capacity,
                "rejecting entry larger than cache capacity"
            );
            return Err(CacheError::EntryTooLarge {
                key,
                size,
                capacity: self.shared.capacity,
            });
        }
        let ttl = ttl.unwrap_or(self.shared.default_ttl);

        let evicted = {
            let mut guard = self.shared.state.lock();
            let state = &mut *guard;

            state.remove_entry(&key);
            let evicted = state.make_room(size, Utc::now());

            let entry = CacheEntry::new(value, ttl, size);
            state.index.on_insert(&key, entry.expires_at);
            state.size.admit(size);
            state.entries.insert(key, entry);
            evicted
        };

        if evicted > 0 {
            debug!(evicted, "evicted entries to admit write");
        }
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed on the spot and count as both a miss and
    /// an expiration.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Utc::now();
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;

        let expired = match state.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                state.stats.record_miss();
                return None;
            }
        };

        if expired {
            state.remove_entry(key);
            state.stats.record_miss();
            state.stats.record_expiration();
            return None;
        }

        let entry = state.entries.get_mut(key)?;
        entry.touch(now);
        let value = entry.value.clone();
        state.index.on_access(key);
        state.stats.record_hit();
        Some(value)
    }

    /// Returns the cached value, or computes, stores and returns it.
    ///
    /// The factory runs outside the lock; concurrent callers may both compute,
    /// in which case the last write wins.
    pub fn get_or_insert_with<F>(&self, key: &str, ttl: Option<Duration>, factory: F) -> Result<V>
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = factory();
        self.set(key, value.clone(), ttl)?;
        Ok(value)
    }

    // == Delete ==
    /// Removes an entry by key. Absent keys are a no-op.
    pub fn delete(&self, key: &str) {
        self.shared.state.lock().remove_entry(key);
    }

    // == Invalidate ==
    /// Removes every key matching a restricted glob and returns how many
    /// were removed.
    ///
    /// `*` matches all keys, `prefix*` matches by prefix, anything else is
    /// an exact key. Other uses of `*` match nothing.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let pattern = KeyPattern::parse(pattern);
        let mut state = self.shared.state.lock();

        let removed = match &pattern {
            KeyPattern::Exact(key) => usize::from(state.remove_entry(key).is_some()),
            KeyPattern::Nothing => 0,
            _ => {
                let keys: Vec<String> = state
                    .entries
                    .keys()
                    .filter(|key| pattern.matches(key))
                    .cloned()
                    .collect();
                for key in &keys {
                    state.remove_entry(key);
                }
                keys.len()
            }
        };

        drop(state);
        debug!(?pattern, removed, "invalidated keys");
        removed
    }

    // == Stats ==
    /// Returns a consistent snapshot of counters and gauges.
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock();
        state
            .stats
            .snapshot(state.entries.len(), state.size.current(), state.size.capacity())
    }

    // == Purge Expired ==
    /// Removes all expired entries; what each sweeper tick runs.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.shared.state.lock().purge_expired()
    }

    /// Whether the key is resident, expired or not. Does not touch stats.
    pub fn contains_key(&self, key: &str) -> bool {
        self.shared.state.lock().entries.contains_key(key)
    }

    /// Remaining lifetime of a live entry. Does not touch stats.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let state = self.shared.state.lock();
        state
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }

    /// Drops every entry. Counters are kept; nothing counts as evicted.
    pub fn clear(&self) {
        let mut state = self.shared.state.lock();
        state.entries.clear();
        state.index.clear();
        state.size.reset();
    }

    /// Stops the expiry sweeper. The cache keeps serving requests; expired
    /// entries are then only reclaimed lazily or via [`Self::purge_expired`].
    pub fn shutdown(&self) {
        self.sweeper.stop();
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> u64 {
        self.shared.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.shared.policy
    }

    pub fn default_ttl(&self) -> Duration {
        self.shared.default_ttl
    }
}
