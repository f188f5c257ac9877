//! Warm Cache Loader
//!
//! Preloads a fixed key set into the cache and keeps rewriting it on an
//! interval until a shutdown signal resolves. Warmed keys go through the
//! normal `set` path, so they get no protection from eviction.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::CacheEngine;

type Factory<V> = Arc<dyn Fn() -> anyhow::Result<V> + Send + Sync>;

/// Longest refresh period; longer requests are clamped so the tick
/// deadline stays inside the clock's range.
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// == Preload Source ==
/// Where a warmed value comes from on each refresh.
pub enum Preload<V> {
    /// A fixed value, cloned on every refresh
    Value(V),
    /// Recomputed on every refresh; failures skip the key for that round
    Factory(Factory<V>),
}

impl<V: Clone> Preload<V> {
    fn resolve(&self) -> anyhow::Result<V> {
        match self {
            Preload::Value(value) => Ok(value.clone()),
            Preload::Factory(factory) => factory(),
        }
    }
}

impl<V: Clone> Clone for Preload<V> {
    fn clone(&self) -> Self {
        match self {
            Preload::Value(value) => Preload::Value(value.clone()),
            Preload::Factory(factory) => Preload::Factory(Arc::clone(factory)),
        }
    }
}

impl<V> fmt::Debug for Preload<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preload::Value(_) => f.write_str("Preload::Value"),
            Preload::Factory(_) => f.write_str("Preload::Factory"),
        }
    }
}

// == Warm Cache Loader ==
/// Keeps a fixed set of keys populated in a [`CacheEngine`].
pub struct WarmCacheLoader<V> {
    cache: CacheEngine<V>,
    preloads: Arc<Mutex<Vec<(String, Preload<V>)>>>,
    refresh_interval: Duration,
    ttl: Option<Duration>,
}

impl<V> Clone for WarmCacheLoader<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            preloads: Arc::clone(&self.preloads),
            refresh_interval: self.refresh_interval,
            ttl: self.ttl,
        }
    }
}

impl<V> fmt::Debug for WarmCacheLoader<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarmCacheLoader")
            .field("preloads", &self.preloads.lock().len())
            .field("refresh_interval", &self.refresh_interval)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<V> WarmCacheLoader<V>
where
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a loader writing into `cache` every `refresh_interval`.
    ///
    /// Warmed entries use the cache's default TTL unless [`Self::with_ttl`]
    /// overrides it. The interval is clamped between one millisecond and
    /// [`MAX_REFRESH_INTERVAL`].
    pub fn new(cache: CacheEngine<V>, refresh_interval: Duration) -> Self {
        Self {
            cache,
            preloads: Arc::new(Mutex::new(Vec::new())),
            refresh_interval: refresh_interval.clamp(Duration::from_millis(1), MAX_REFRESH_INTERVAL),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    // == Add Preload ==
    /// Registers a fixed value for `key`. Re-adding a key replaces its source.
    pub fn add_preload(&self, key: impl Into<String>, value: V) {
        self.insert(key.into(), Preload::Value(value));
    }

    /// Registers a factory evaluated on every refresh.
    pub fn add_preload_with<F>(&self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> anyhow::Result<V> + Send + Sync + 'static,
    {
        self.insert(key.into(), Preload::Factory(Arc::new(factory)));
    }

    fn insert(&self, key: String, source: Preload<V>) {
        let mut preloads = self.preloads.lock();
        match preloads.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = source,
            None => preloads.push((key, source)),
        }
    }

    pub fn len(&self) -> usize {
        self.preloads.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    // == Warm Once ==
    /// Writes every preload into the cache once; returns how many were written.
    ///
    /// Values are resolved outside the preload lock so slow factories do not
    /// block `add_preload`.
    pub fn warm_once(&self) -> usize {
        let snapshot: Vec<(String, Preload<V>)> = self
            .preloads
            .lock()
            .iter()
            .map(|(key, source)| (key.clone(), source.clone()))
            .collect();

        let mut written = 0;
        for (key, source) in snapshot {
            match source.resolve() {
                Ok(value) => match self.cache.set(key.as_str(), value, self.ttl) {
                    Ok(()) => written += 1,
                    Err(err) => warn!(key = %key, error = %err, "warm write rejected"),
                },
                Err(err) => warn!(key = %key, error = %err, "warm factory failed"),
            }
        }
        debug!(written, "warm cache refreshed");
        written
    }

    // == Start ==
    /// Populates the cache immediately, then refreshes on the interval until
    /// `shutdown` resolves.
    ///
    /// Cancellation stops further refreshes; a write already in progress is
    /// not rolled back.
    pub fn start<S>(&self, shutdown: S) -> JoinHandle<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let loader = self.clone();

        tokio::spawn(async move {
            info!(
                keys = loader.len(),
                interval = ?loader.refresh_interval,
                "warm cache loader started"
            );
            loader.warm_once();

            let period = loader.refresh_interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    _ = ticker.tick() => {
                        loader.warm_once();
                    }
                }
            }

            info!("warm cache loader stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{EvictionPolicy, Weigher};
    use crate::config::CacheConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn engine(capacity: u64) -> CacheEngine<String> {
        CacheEngine::new(capacity, EvictionPolicy::Lru, Duration::from_secs(300)).unwrap()
    }

    #[test]
    fn test_warm_once_writes_values_and_factories() {
        let cache = engine(100);
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_secs(60));
        loader.add_preload("config:a", "alpha".to_string());
        loader.add_preload_with("config:b", || Ok("beta".to_string()));

        assert_eq!(loader.warm_once(), 2);
        assert_eq!(cache.get("config:a"), Some("alpha".to_string()));
        assert_eq!(cache.get("config:b"), Some("beta".to_string()));
    }

    #[test]
    fn test_failing_factory_is_skipped() {
        let cache = engine(100);
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_secs(60));
        loader.add_preload_with("broken", || Err(anyhow::anyhow!("backend down")));
        loader.add_preload("fine", "ok".to_string());

        assert_eq!(loader.warm_once(), 1);
        assert!(!cache.contains_key("broken"));
        assert!(cache.contains_key("fine"));
    }

    #[test]
    fn test_oversized_preload_is_skipped() {
        let config = CacheConfig {
            capacity: 4,
            ..CacheConfig::default()
        };
        let cache: CacheEngine<String> = CacheEngine::from_config(&config, Weigher::bytes()).unwrap();
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_secs(60));
        loader.add_preload("huge", "far too large".to_string());

        assert_eq!(loader.warm_once(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_re_adding_key_replaces_source() {
        let cache = engine(100);
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_secs(60));
        loader.add_preload("k", "first".to_string());
        loader.add_preload("k", "second".to_string());

        assert_eq!(loader.len(), 1);
        loader.warm_once();
        assert_eq!(cache.get("k"), Some("second".to_string()));
    }

    #[test]
    fn test_warm_ttl_override() {
        let cache = engine(100);
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_secs(60))
            .with_ttl(Duration::from_secs(5));
        loader.add_preload("k", "v".to_string());
        loader.warm_once();

        let remaining = cache.ttl_remaining("k").unwrap();
        assert!(remaining <= Duration::from_secs(5));
    }

    #[test]
    fn test_already_cancelled_start_still_warms_once() {
        let cache = engine(100);
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_millis(5));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        loader.add_preload_with("k", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("v".to_string())
        });

        tokio_test::block_on(async {
            loader.start(std::future::ready(())).await.unwrap();
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains_key("k"));
    }

    #[tokio::test]
    async fn test_start_populates_immediately() {
        let cache = engine(100);
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_secs(3600));
        loader.add_preload("k", "v".to_string());

        let (tx, rx) = oneshot::channel::<()>();
        let handle = loader.start(async move {
            let _ = rx.await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get("k"), Some("v".to_string()));

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_start_refreshes_until_cancelled() {
        let cache = engine(100);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_millis(20));
        loader.add_preload_with("counter", move || {
            Ok(counter.fetch_add(1, Ordering::SeqCst).to_string())
        });

        let (tx, rx) = oneshot::channel::<()>();
        let handle = loader.start(async move {
            let _ = rx.await;
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        tx.send(()).unwrap();
        handle.await.unwrap();

        let after_stop = calls.load(Ordering::SeqCst);
        assert!(after_stop >= 3, "expected several refreshes, got {after_stop}");

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn test_huge_interval_is_clamped_and_loader_keeps_running() {
        let cache = engine(100);
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_secs(u64::MAX));
        assert_eq!(loader.refresh_interval(), MAX_REFRESH_INTERVAL);
        loader.add_preload("k", "v".to_string());

        let (tx, rx) = oneshot::channel::<()>();
        let handle = loader.start(async move {
            let _ = rx.await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());
        assert_eq!(cache.get("k"), Some("v".to_string()));

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn test_tiny_interval_is_raised() {
        let loader = WarmCacheLoader::new(engine(10), Duration::ZERO);
        assert_eq!(loader.refresh_interval(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_refresh_rewrites_deleted_key() {
        let cache = engine(100);
        let loader = WarmCacheLoader::new(cache.clone(), Duration::from_millis(20));
        loader.add_preload("k", "v".to_string());

        let handle = loader.start(tokio::time::sleep(Duration::from_millis(200)));

        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.delete("k");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.contains_key("k"));

        handle.await.unwrap();
    }
}
