//! Configuration Module
//!
//! Handles loading and managing in-process store configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default interval between reclamation sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Smallest interval the cleanup task will honour.
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(1);

/// In-process store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Interval between background sweeps of expired entries
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL),
        }
    }

    /// Sets the cleanup interval.
    ///
    /// # Arguments
    /// * `interval` - The duration between sweeps
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Interval the cleanup task actually sleeps for.
    pub(crate) fn effective_cleanup_interval(&self) -> Duration {
        self.cleanup_interval.max(MIN_CLEANUP_INTERVAL)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}
