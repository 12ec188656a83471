//! Mini Cache - A pluggable key/value cache
//!
//! Provides a uniform [`Backend`] contract, an in-process [`MemoryStore`] with
//! TTL expiration and background reclamation, and a typed [`Cache`] facade
//! with cache-aside [`remember`](Cache::remember).

pub mod backend;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod memory;
mod tasks;

pub use backend::Backend;
pub use cache::Cache;
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use memory::{Expiry, MemoryStore, StoreStats};
