//! Cache Entry Module
//!
//! A stored upstream payload with its insertion and expiry stamps.

use std::time::Duration;

// == Cache Entry ==
/// Single cached value owned by one cache instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The cached payload
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Expiration timestamp (Unix milliseconds), `inserted_at + ttl`
    pub expires_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped at `now_ms` that lives for `ttl`.
    pub fn new(value: V, now_ms: u64, ttl: Duration) -> Self {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        Self {
            value,
            inserted_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    // == Validity ==
    /// An entry is valid only while `now < expires_at`.
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at
    }
}
