//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the
//! in-process store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::memory::StoreInner;

/// Spawns a background task that periodically cleans up expired entries.
///
/// The task sleeps for `interval` between runs and acquires the store's write
/// lock once per run. It exits when `shutdown_rx` observes `true` or its
/// sender is dropped.
///
/// # Arguments
/// * `store` - Shared store state to sweep
/// * `interval` - Interval between cleanup runs
/// * `shutdown_rx` - Shutdown signal from the owning store
///
/// # Returns
/// A JoinHandle for the spawned task.
pub(crate) fn spawn_cleanup_task(
    store: Arc<StoreInner>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(?interval, "Starting TTL cleanup task");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let removed = store.sweep_expired().await;

                    if removed > 0 {
                        info!("TTL cleanup: removed {} expired entries", removed);
                    } else {
                        debug!("TTL cleanup: no expired entries found");
                    }
                }
                changed = shutdown_rx.changed() => {
                    // Err means the store was dropped
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("TTL cleanup task stopped");
    })
}
