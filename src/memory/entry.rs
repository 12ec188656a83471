//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

// == Expiry ==
/// How long an entry stays live after it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// The entry never expires; only `delete` or `clear` remove it
    #[default]
    Never,
    /// The entry expires once this much time has passed since the write
    After(Duration),
}

impl Expiry {
    /// Absolute deadline for an entry written at `now`.
    ///
    /// Returns `None` for entries that never expire. A TTL too large to
    /// represent is treated as never expiring.
    pub fn deadline_from(self, now: Instant) -> Option<Instant> {
        match self {
            Expiry::Never => None,
            Expiry::After(ttl) => now.checked_add(ttl),
        }
    }
}

impl From<Duration> for Expiry {
    /// A zero duration means "no expiry".
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Expiry::Never
        } else {
            Expiry::After(ttl)
        }
    }
}

impl From<Option<Duration>> for Expiry {
    fn from(ttl: Option<Duration>) -> Self {
        ttl.map(Expiry::from).unwrap_or(Expiry::Never)
    }
}

// == Cache Entry ==
/// A stored payload paired with its expiration instant.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The encoded value
    pub payload: Bytes,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry that expires according to `expiry`, counted from now.
    pub fn new(payload: Bytes, expiry: Expiry) -> Self {
        Self {
            payload,
            expires_at: expiry.deadline_from(Instant::now()),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is live only while `now < expires_at`, so it
    /// is already expired at the exact expiration instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks if the entry has expired as of the current instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}
