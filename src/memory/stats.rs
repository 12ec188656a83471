//! Cache Statistics Module
//!
//! Tracks store activity: read hits and misses plus entries reclaimed by the
//! background sweep.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Store Stats ==
/// Point-in-time snapshot of store activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing (absent or expired)
    pub misses: u64,
    /// Number of expired entries physically removed by sweeps
    pub reclaimed: u64,
    /// Number of live entries at snapshot time
    pub live_entries: usize,
}

impl StoreStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Counters ==
/// Lock-free counters updated from behind a read lock.
#[derive(Debug, Default)]
pub(crate) struct StoreCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    reclaimed: AtomicU64,
}

impl StoreCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reclaimed(&self, count: usize) {
        self.reclaimed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, live_entries: usize) -> StoreStats {
        StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
            live_entries,
        }
    }
}
