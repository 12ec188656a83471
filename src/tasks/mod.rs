//! Background Tasks Module
//!
//! Contains background tasks owned by the in-process store.
//!
//! # Tasks
//! - TTL Cleanup: Removes expired entries at the configured interval

mod cleanup;

pub(crate) use cleanup::spawn_cleanup_task;
