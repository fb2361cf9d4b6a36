//! Cache Module
//!
//! Per-domain response caches with a fixed TTL per instance.

mod entry;
mod stats;
mod store;


pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::ResponseCache;
