//! Response Cache Module
//!
//! Keyed TTL storage for upstream payloads. One instance per resource domain;
//! every entry in an instance shares the instance's TTL.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};
use crate::clock::{system_clock, SharedClock};

/// Entries plus the counters only writers touch.
#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

// == Response Cache ==
/// TTL cache with fetch-on-miss left to the caller.
///
/// A hit only takes the read lock; the write lock is needed to store, or to
/// purge an entry a read found expired.
#[derive(Debug)]
pub struct ResponseCache<V> {
    /// Domain label used in logs and stats
    name: String,
    /// Lifetime applied to every entry
    ttl: Duration,
    state: RwLock<CacheState<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    clock: SharedClock,
}

impl<V: Clone + Send + Sync> ResponseCache<V> {
    // == Constructors ==
    /// Creates an empty cache on the system clock.
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self::with_clock(name, ttl, system_clock())
    }

    /// Creates an empty cache on the given clock.
    pub fn with_clock(name: impl Into<String>, ttl: Duration, clock: SharedClock) -> Self {
        Self {
            name: name.into(),
            ttl,
            state: RwLock::new(CacheState {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            clock,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Get ==
    /// Returns the value for `key` while `now < expires_at`, otherwise `None`.
    ///
    /// An entry found expired is purged on the spot.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        {
            let state = self.state.read().await;
            match state.entries.get(key) {
                Some(entry) if entry.is_valid_at(now) => {
                    return Some(self.hit(key, entry.value.clone()));
                }
                Some(_) => {}
                None => return self.miss(key),
            }
        }

        // Expired under the read lock; a set may have refreshed it since
        let mut state = self.state.write().await;
        if let Some(entry) = state.entries.get(key) {
            if entry.is_valid_at(now) {
                return Some(self.hit(key, entry.value.clone()));
            }
        }
        if state.entries.remove(key).is_some() {
            state.stats.record_expired(1);
        }
        self.miss(key)
    }

    fn hit(&self, key: &str, value: V) -> V {
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(cache = %self.name, key, "cache hit");
        value
    }

    fn miss(&self, key: &str) -> Option<V> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(cache = %self.name, key, "cache miss");
        None
    }

    // == Set ==
    /// Stores or replaces the entry for `key`, restarting its TTL.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), self.ttl);
        let mut state = self.state.write().await;
        state.entries.insert(key.into(), entry);
        state.stats.record_insert();
    }

    // == Get Or Populate ==
    /// Serves `key` from cache, or awaits `fetch` and stores its result.
    ///
    /// A failed fetch stores nothing and its error is returned as is. The lock
    /// is released while `fetch` runs, so racing misses for the same key may
    /// both fetch; the last `set` wins.
    pub async fn get_or_populate<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = fetch().await?;
        self.set(key, value.clone()).await;
        Ok(value)
    }

    // == Remove ==
    /// Drops the entry for `key`. Returns whether one was tracked.
    pub async fn remove(&self, key: &str) -> bool {
        self.state.write().await.entries.remove(key).is_some()
    }

    // == Cleanup Expired ==
    /// Purges every expired entry and returns how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.state.write().await;

        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_valid_at(now));
        let removed = before - state.entries.len();

        state.stats.record_expired(removed);
        removed
    }

    // == Size ==
    /// Number of tracked keys, including expired entries not yet purged.
    pub async fn size(&self) -> usize {
        self.state.read().await.entries.len()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            total_entries: state.entries.len(),
            ..state.stats.clone()
        }
    }
}
