//! Error types for the cache
//!
//! Provides unified error handling using thiserror. A cache miss is never an
//! error; it is reported as `Ok(None)` / `Ok(false)` by the read operations.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache backends and the [`Cache`](crate::Cache) facade.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be encoded to, or decoded from, its byte payload
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The backend failed to perform the operation
    #[error("Backend error: {0}")]
    Backend(String),

    /// The compute function passed to `remember` failed
    #[error(transparent)]
    Compute(anyhow::Error),

    /// The in-process store needs a Tokio runtime to run its cleanup task
    #[error("In-memory store requires a Tokio runtime")]
    NoRuntime,
}

impl CacheError {
    /// Returns true if this error came from a `remember` compute function.
    pub fn is_compute(&self) -> bool {
        matches!(self, CacheError::Compute(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
