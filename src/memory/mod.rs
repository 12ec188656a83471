//! In-Process Backend Module
//!
//! Provides an in-memory store with lazy TTL expiration and background reclamation.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{Entry, Expiry};
pub use stats::StoreStats;
pub use store::MemoryStore;

pub(crate) use store::StoreInner;
