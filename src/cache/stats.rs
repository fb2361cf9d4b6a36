//! Cache Statistics Module
//!
//! Per-instance counters for lookups, stores and expiry purges.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of one cache instance's counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a valid entry
    pub hits: u64,
    /// Lookups that found nothing valid (absent or expired)
    pub misses: u64,
    /// Entries physically purged after expiring, lazily or by a sweep
    pub expired: u64,
    /// Calls to `set`, including overwrites
    pub inserts: u64,
    /// Keys currently tracked, expired-but-unpurged included
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }

    pub fn record_insert(&mut self) {
        self.inserts += 1;
    }

    /// Adds `count` purged entries.
    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_lookups() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::new()
        };
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_inserts_do_not_affect_hit_rate() {
        let mut stats = CacheStats::new();
        stats.record_insert();
        stats.record_insert();
        stats.misses = 1;
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_record_expired_accumulates() {
        let mut stats = CacheStats::new();
        stats.record_expired(1);
        stats.record_expired(3);
        stats.record_expired(0);
        assert_eq!(stats.expired, 4);
    }
}
