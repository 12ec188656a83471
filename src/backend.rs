//! Backend Module
//!
//! The storage contract every cache backend satisfies. Backends deal only in
//! opaque byte payloads; typed encoding happens in the [`Cache`](crate::Cache)
//! facade.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::memory::Expiry;

// == Backend Trait ==
/// Key/value storage with per-entry expiration.
///
/// Implementations must report an ordinary miss (absent or expired key) as
/// `Ok(None)` from [`get`](Backend::get) and `Ok(false)` from
/// [`exists`](Backend::exists). Errors are reserved for real failures.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the payload stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Stores `payload` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, payload: Bytes, expiry: Expiry) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Returns true iff `key` is present and live.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Removes every entry in the backend.
    async fn clear(&self) -> Result<()>;

    /// Releases background resources held by the backend.
    ///
    /// The default does nothing.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
