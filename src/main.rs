//! Adaptive Cache - demo runner
//!
//! Drives a synthetic concurrent workload against the cache engine and
//! reports statistics, using the same configuration an embedding service
//! would load.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adaptive_cache::{generate_key, CacheConfig, CacheEngine, WarmCacheLoader, Weigher};

const WORKERS: usize = 4;
const KEY_SPACE: usize = 2048;
const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Main entry point for the demo runner.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache engine (starts the expiry sweeper)
/// 4. Start the warm loader and workload tasks
/// 5. Run until SIGINT/SIGTERM, then stop tasks and print final stats
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adaptive_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env().context("loading cache configuration")?;
    info!(
        capacity = config.capacity,
        policy = %config.policy,
        default_ttl_s = config.default_ttl.as_secs(),
        cleanup_interval_s = config.cleanup_interval.as_secs(),
        "configuration loaded"
    );

    let cache: CacheEngine<String> =
        CacheEngine::from_config(&config, Weigher::bytes()).context("creating cache engine")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let loader = WarmCacheLoader::new(cache.clone(), config.warm_refresh_interval);
    loader.add_preload("site:banner", "Welcome back".to_string());
    loader.add_preload_with("site:started_at", || Ok(chrono::Utc::now().to_rfc3339()));
    let loader_handle = loader.start(stopped(shutdown_rx.clone()));

    let mut workers = Vec::with_capacity(WORKERS);
    for worker in 0..WORKERS {
        workers.push(tokio::spawn(run_worker(
            cache.clone(),
            worker,
            shutdown_rx.clone(),
        )));
    }

    let reporter = {
        let cache = cache.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(STATS_INTERVAL);
            let stop = stopped(shutdown);
            tokio::pin!(stop);
            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    _ = ticker.tick() => {
                        let stats = cache.stats();
                        info!(
                            hits = stats.hits,
                            misses = stats.misses,
                            evictions = stats.evictions,
                            expirations = stats.expirations,
                            entries = stats.current_entries,
                            size = stats.current_size,
                            hit_rate = stats.hit_rate,
                            "cache stats"
                        );
                    }
                }
            }
        })
    };

    shutdown_signal().await;
    shutdown_tx.send_replace(true);

    for handle in workers {
        handle.await.context("workload task failed")?;
    }
    loader_handle.await.context("warm loader task failed")?;
    reporter.await.context("stats reporter task failed")?;

    cache.shutdown();
    println!("{}", serde_json::to_string_pretty(&cache.stats())?);
    info!("Shutdown complete");
    Ok(())
}

/// Mixed read-heavy workload over a fixed key space.
async fn run_worker(cache: CacheEngine<String>, worker: usize, shutdown: watch::Receiver<bool>) {
    for i in 0usize.. {
        if *shutdown.borrow() {
            break;
        }
        // Skew reads toward the low end of the key space
        let slot = i.wrapping_mul(31).wrapping_add(worker) % KEY_SPACE;
        let slot = if i % 3 == 0 { slot } else { slot % (KEY_SPACE / 8) };
        let key = generate_key(["item", &slot.to_string()]);

        if cache.get(&key).is_none() {
            let value = format!("payload-{slot}-{}", "x".repeat(slot % 64));
            let ttl = Duration::from_secs(5 + (slot % 30) as u64);
            if let Err(err) = cache.set(key, value, Some(ttl)) {
                warn!(error = %err, "workload write rejected");
            }
        }

        if i % 256 == 255 {
            tokio::task::yield_now().await;
        }
        if i % 4096 == 4095 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

/// Resolves once the shutdown flag flips (or its sender is gone).
async fn stopped(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopped| *stopped).await;
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
