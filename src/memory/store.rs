//! Cache Store Module
//!
//! In-process backend: a HashMap of expiring entries behind one reader/writer
//! lock, plus the background task that reclaims expired entries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::backend::Backend;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::memory::stats::StoreCounters;
use crate::memory::{Entry, Expiry, StoreStats};
use crate::tasks::spawn_cleanup_task;

// == Shared State ==
/// State shared between the store handle and its cleanup task.
#[derive(Debug, Default)]
pub(crate) struct StoreInner {
    entries: RwLock<HashMap<String, Entry>>,
    counters: StoreCounters,
}

impl StoreInner {
    // == Sweep Expired ==
    /// Removes all expired entries under a single write lock.
    ///
    /// Returns the number of entries removed.
    pub(crate) async fn sweep_expired(&self) -> usize {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            let now = Instant::now();
            entries.retain(|_, entry| !entry.is_expired_at(now));
            before - entries.len()
        };

        self.counters.record_reclaimed(removed);
        removed
    }
}

// == Memory Store ==
/// Thread-safe in-process backend with TTL support.
///
/// Expiration is checked on every read, so an expired entry is never visible
/// even before the background sweep has physically removed it. The sweep only
/// bounds memory held by keys that are written and never read again.
///
/// The cleanup task stops when [`close`](MemoryStore::close) is called or the
/// store is dropped.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use mini_cache::{Backend, MemoryStore};
///
/// # async fn run() -> mini_cache::Result<()> {
/// let store = MemoryStore::new()?;
/// store.set("greeting", "\"hello\"".into(), Duration::from_secs(300).into()).await?;
/// assert!(store.exists("greeting").await?);
/// store.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
    shutdown_tx: watch::Sender<bool>,
    cleanup_handle: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store with the default configuration.
    ///
    /// # Errors
    /// Returns [`CacheError::NoRuntime`] when called outside a Tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a store and starts its cleanup task.
    ///
    /// # Arguments
    /// * `config` - Store configuration (cleanup interval)
    ///
    /// # Errors
    /// Returns [`CacheError::NoRuntime`] when called outside a Tokio runtime.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::NoRuntime);
        }

        let inner = Arc::new(StoreInner::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_cleanup_task(
            Arc::clone(&inner),
            config.effective_cleanup_interval(),
            shutdown_rx,
        );

        Ok(Self {
            inner,
            shutdown_tx,
            cleanup_handle: Mutex::new(Some(handle)),
        })
    }

    // == Sweep ==
    /// Runs one reclamation pass immediately.
    ///
    /// Returns the number of expired entries removed.
    pub async fn sweep(&self) -> usize {
        self.inner.sweep_expired().await
    }

    // == Length ==
    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        let entries = self.inner.entries.read().await;
        let now = Instant::now();
        entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    // == Is Empty ==
    /// Returns true if the store holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // == Stats ==
    /// Returns current store statistics.
    pub async fn stats(&self) -> StoreStats {
        let live_entries = self.len().await;
        self.inner.counters.snapshot(live_entries)
    }

    // == Close ==
    /// Stops the cleanup task and waits for it to exit.
    ///
    /// Stored entries stay readable afterwards; expired ones are simply no
    /// longer reclaimed. Calling `close` more than once is a no-op.
    pub async fn close(&self) -> Result<()> {
        self.shutdown_tx.send_replace(true);

        let handle = self.cleanup_handle.lock().await.take();
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| CacheError::Backend(format!("cleanup task failed: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryStore {
    // == Get ==
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let entries = self.inner.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.inner.counters.record_hit();
                Ok(Some(entry.payload.clone()))
            }
            _ => {
                self.inner.counters.record_miss();
                Ok(None)
            }
        }
    }

    // == Set ==
    async fn set(&self, key: &str, payload: Bytes, expiry: Expiry) -> Result<()> {
        let mut entries = self.inner.entries.write().await;
        entries.insert(key.to_string(), Entry::new(payload, expiry));
        Ok(())
    }

    // == Delete ==
    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.inner.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    // == Exists ==
    async fn exists(&self, key: &str) -> Result<bool> {
        let entries = self.inner.entries.read().await;
        Ok(entries.get(key).is_some_and(|entry| !entry.is_expired()))
    }

    // == Clear ==
    async fn clear(&self) -> Result<()> {
        let old = {
            let mut entries = self.inner.entries.write().await;
            std::mem::take(&mut *entries)
        };
        // Old map is freed after the lock is released
        drop(old);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        MemoryStore::close(self).await
    }
}
