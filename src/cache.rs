//! Cache Facade
//!
//! Typed front end over any [`Backend`]. Values are encoded with
//! [`codec`](crate::codec) on the way in and decoded on the way out; the
//! backend itself only sees bytes.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::backend::Backend;
use crate::codec;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::memory::{Expiry, MemoryStore};

// == Cache ==
/// A cache over one backend instance.
///
/// Cloning is cheap and clones share the same backend.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn Backend>,
}

impl Cache {
    // == Constructors ==
    /// Creates a cache that owns `backend`.
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates a cache over a backend that is already shared.
    pub fn from_shared(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Creates a cache backed by a fresh [`MemoryStore`].
    ///
    /// # Errors
    /// Returns [`CacheError::NoRuntime`] when called outside a Tokio runtime.
    pub fn in_memory(config: CacheConfig) -> Result<Self> {
        Ok(Self::new(MemoryStore::with_config(config)?))
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    // == Get ==
    /// Looks up `key` and decodes it into `T`.
    ///
    /// # Returns
    /// - `Ok(Some(value))` on a hit
    /// - `Ok(None)` if the key is absent or expired
    /// - `Err(CacheError::Encoding)` if the stored payload is not a valid `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key).await? {
            Some(payload) => codec::decode(&payload).map(Some),
            None => Ok(None),
        }
    }

    // == Set ==
    /// Encodes `value` and stores it under `key`.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - Any serializable value
    /// * `ttl` - A `Duration` (zero = never expires), `Option<Duration>` or [`Expiry`]
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: impl Into<Expiry>,
    ) -> Result<()> {
        let payload = codec::encode(value)?;
        self.backend.set(key, payload, ttl.into()).await
    }

    /// Removes `key`; absent keys are not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.backend.delete(key).await
    }

    /// Returns true iff `key` is present and live.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.backend.exists(key).await
    }

    /// Removes every entry in the backend.
    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await
    }

    /// Releases the backend's background resources.
    pub async fn close(&self) -> Result<()> {
        self.backend.close().await
    }

    // == Remember ==
    /// Returns the cached value for `key`, computing and storing it when needed.
    ///
    /// `compute` runs when the key is missing, expired, or holds a payload that
    /// cannot be decoded as `T`. Its result is stored with `ttl` and returned.
    /// It runs outside any backend lock, so it may use this cache itself.
    ///
    /// Concurrent calls for the same key are not coordinated: each caller that
    /// misses runs its own `compute` and the last write wins.
    ///
    /// # Errors
    /// - [`CacheError::Compute`] wrapping the error returned by `compute`;
    ///   nothing is written in that case
    /// - any error from storing the computed value
    pub async fn remember<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: impl Into<Expiry>,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        E: Into<anyhow::Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        match self.get::<T>(key).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => debug!(key, "cache miss, computing value"),
            Err(err) => debug!(key, error = %err, "cache read failed, computing value"),
        }

        let value = compute()
            .await
            .map_err(|e| CacheError::Compute(e.into()))?;
        self.set(key, &value, ttl).await?;
        Ok(value)
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}
