//! Background Tasks Module
//!
//! Contains background tasks that run alongside foreground cache traffic.
//!
//! # Tasks
//! - Expiry Sweeper: removes expired entries on a fixed interval (dedicated thread)
//! - Warm Cache Loader: preloads and refreshes a fixed key set (tokio task)

mod sweeper;
mod warm;

pub use sweeper::ExpirySweeper;
pub use warm::{Preload, WarmCacheLoader, MAX_REFRESH_INTERVAL};
