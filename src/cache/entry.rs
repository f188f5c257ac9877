//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and access metadata.

use std::time::Duration;

use chrono::{DateTime, Utc};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Only `access_count` and `last_access` change after creation. The expiry
/// instant is fixed when the entry is written; reads never extend it.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiration timestamp (`created_at + ttl`)
    pub expires_at: DateTime<Utc>,
    /// TTL the entry was written with
    pub ttl: Duration,
    /// Number of successful reads
    pub access_count: u64,
    /// Timestamp of the last successful read, or creation
    pub last_access: DateTime<Utc>,
    /// Size in weigher units
    pub size: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Time to live
    /// * `size` - Size in the engine's capacity units
    pub fn new(value: V, ttl: Duration, size: u64) -> Self {
        Self::new_at(value, ttl, size, Utc::now())
    }

    pub(crate) fn new_at(value: V, ttl: Duration, size: u64, now: DateTime<Utc>) -> Self {
        // TTLs beyond chrono's range saturate to "never expires" in practice.
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            value,
            created_at: now,
            expires_at,
            ttl,
            access_count: 0,
            last_access: now,
            size,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// An entry is expired strictly after its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    // == Touch ==
    /// Records a successful read.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count += 1;
        self.last_access = now;
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self) -> Duration {
        (self.expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("test_value".to_string(), Duration::from_secs(60), 3);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.size, 3);
        assert_eq!(entry.access_count, 0);
        assert_eq!(entry.last_access, entry.created_at);
        assert_eq!(
            entry.expires_at - entry.created_at,
            chrono::Duration::seconds(60)
        );
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value", Duration::from_millis(20), 1);

        assert!(!entry.is_expired());
        sleep(Duration::from_millis(60));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = CacheEntry::new_at("test", Duration::ZERO, 1, now);

        // Exactly at the expiry instant the entry is still live
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_touch_does_not_extend_expiry() {
        let now = Utc::now();
        let mut entry = CacheEntry::new_at("v", Duration::from_secs(5), 1, now);
        let expires_at = entry.expires_at;

        let later = now + chrono::Duration::seconds(3);
        entry.touch(later);
        entry.touch(later);

        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.last_access, later);
        assert_eq!(entry.expires_at, expires_at);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new("v", Duration::MAX, 1);
        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("v", Duration::from_secs(10), 1);
        let remaining = entry.ttl_remaining();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = CacheEntry::new("v", Duration::from_millis(10), 1);
        sleep(Duration::from_millis(40));
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }
}
