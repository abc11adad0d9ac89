//! Persistent freshness caching for expensive aggregations.

pub mod freshness;
pub mod slot;

pub use freshness::{CacheEntry, FreshnessCache, SummaryReading, CATEGORY_CACHE_KEY, DEFAULT_TTL};
pub use slot::{FileSlot, KvSlot, MemorySlot};
