//! Expiry Sweeper
//!
//! Background thread that periodically removes expired cache entries,
//! independent of capacity pressure and of whether anyone reads them.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::error::Result;

#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    // Sleeps until the deadline or a stop request; true when stopped.
    // A deadline past the clock's range means waiting for the stop alone.
    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut stopped = self.stopped.lock();
        while !*stopped {
            match deadline {
                Some(deadline) => {
                    if self.condvar.wait_until(&mut stopped, deadline).timed_out() {
                        break;
                    }
                }
                None => self.condvar.wait(&mut stopped),
            }
        }
        *stopped
    }
}

// == Expiry Sweeper ==
/// Handle to the sweeper thread. Dropping it stops and joins the thread.
#[derive(Debug)]
pub struct ExpirySweeper {
    signal: Arc<StopSignal>,
    handle: Mutex<Option<JoinHandle<()>>>,
    interval: Duration,
}

impl ExpirySweeper {
    /// Spawns a thread running `sweep` every `interval` until stopped.
    ///
    /// # Arguments
    /// * `interval` - Time between sweeps; the first sweep runs one interval after start
    /// * `sweep` - One sweep pass, returning the number of entries removed
    pub fn spawn<F>(interval: Duration, mut sweep: F) -> Result<Self>
    where
        F: FnMut() -> usize + Send + 'static,
    {
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name("cache-expiry-sweeper".to_string())
            .spawn(move || {
                info!(?interval, "expiry sweeper started");

                while !thread_signal.wait(interval) {
                    let removed = sweep();
                    if removed > 0 {
                        info!(removed, "expiry sweep removed expired entries");
                    } else {
                        debug!("expiry sweep found no expired entries");
                    }
                }

                info!("expiry sweeper stopped");
            })?;

        Ok(Self {
            signal,
            handle: Mutex::new(Some(handle)),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Stop ==
    /// Signals the thread and waits for it to exit. Idempotent.
    pub fn stop(&self) {
        {
            let mut stopped = self.signal.stopped.lock();
            *stopped = true;
        }
        self.signal.condvar.notify_all();

        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                warn!("expiry sweeper thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_sweeper_runs_on_interval() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let sweeper = ExpirySweeper::spawn(Duration::from_millis(20), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        })
        .unwrap();

        thread::sleep(Duration::from_millis(150));
        sweeper.stop();

        assert!(runs.load(Ordering::SeqCst) >= 2);
        assert_eq!(sweeper.interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_sweeper_stops_promptly() {
        let sweeper = ExpirySweeper::spawn(Duration::from_secs(3600), || 0).unwrap();
        assert!(sweeper.is_running());

        let started = Instant::now();
        sweeper.stop();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!sweeper.is_running());

        // Second stop is a no-op
        sweeper.stop();
    }

    #[test]
    fn test_unbounded_interval_keeps_thread_alive() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let sweeper = ExpirySweeper::spawn(Duration::from_secs(u64::MAX), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0
        })
        .unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(sweeper.is_running());

        let started = Instant::now();
        sweeper.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!sweeper.is_running());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_sweeps_after_stop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let sweeper = ExpirySweeper::spawn(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            1
        })
        .unwrap();
        thread::sleep(Duration::from_millis(50));
        drop(sweeper);

        let after_stop = runs.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(runs.load(Ordering::SeqCst), after_stop);
    }
}
