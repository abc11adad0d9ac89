//! Freshness cache for the category summary
//!
//! The category aggregation is a full collection scan, so its result is
//! parked in a persistent slot with a timestamp. Staleness is evaluated
//! only when reading; an entry never expires in storage. This is request
//! shedding for an expensive scan, not a micro-optimization: the cache
//! survives process restarts and dashboard reloads.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::activity::categories::{CategoryAggregator, CategorySummary};
use crate::cache::slot::KvSlot;
use crate::types::{Result, VantageError};

/// Slot key for the category summary entry
pub const CATEGORY_CACHE_KEY: &str = "video-category-counts";

/// Default TTL: one hour
pub const DEFAULT_TTL: Duration = Duration::from_millis(3_600_000);

/// What a slot entry looks like on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: CategorySummary,
    /// Write time, epoch milliseconds
    pub timestamp: i64,
}

/// Outcome of a cache-backed read, so callers can tell the dashboard
/// whether it is looking at cached or freshly computed numbers.
#[derive(Debug, Clone)]
pub struct SummaryReading {
    pub summary: CategorySummary,
    pub computed_at: i64,
    pub cached: bool,
}

/// TTL cache over an injected [`KvSlot`].
pub struct FreshnessCache {
    slot: Box<dyn KvSlot>,
    key: String,
    ttl: Duration,
}

impl FreshnessCache {
    pub fn new(slot: Box<dyn KvSlot>, ttl: Duration) -> Self {
        Self {
            slot,
            key: CATEGORY_CACHE_KEY.to_string(),
            ttl,
        }
    }

    /// The stored entry if present and fresh, else a miss.
    ///
    /// An entry that fails to deserialize counts as a miss rather than an
    /// error; the next write repairs the slot.
    pub fn read(&self) -> Result<Option<CacheEntry>> {
        self.read_at(now_ms())
    }

    pub(crate) fn read_at(&self, now: i64) -> Result<Option<CacheEntry>> {
        let Some(raw) = self.slot.get(&self.key)? else {
            return Ok(None);
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Discarding undecodable cache entry: {}", e);
                return Ok(None);
            }
        };

        let age = now.saturating_sub(entry.timestamp);
        if age < self.ttl.as_millis() as i64 {
            debug!("Category cache hit (age {}ms)", age);
            Ok(Some(entry))
        } else {
            debug!("Category cache stale (age {}ms)", age);
            Ok(None)
        }
    }

    /// Store a summary, stamped now, replacing any prior entry.
    pub fn write(&self, summary: &CategorySummary) -> Result<CacheEntry> {
        self.write_at(summary, now_ms())
    }

    pub(crate) fn write_at(&self, summary: &CategorySummary, now: i64) -> Result<CacheEntry> {
        let entry = CacheEntry {
            data: summary.clone(),
            timestamp: now,
        };
        let raw = serde_json::to_string(&entry)
            .map_err(|e| VantageError::Internal(format!("Cache entry serialization failed: {e}")))?;
        self.slot.set(&self.key, &raw)?;
        Ok(entry)
    }

    /// Unconditionally clear the slot; the next read is guaranteed a miss.
    pub fn invalidate(&self) -> Result<()> {
        self.slot.delete(&self.key)
    }

    /// Serve from cache on a fresh hit; otherwise run the aggregator,
    /// store the result, and serve that. The aggregator is not contacted
    /// on a hit.
    pub async fn get_or_refresh(&self, aggregator: &CategoryAggregator) -> Result<SummaryReading> {
        if let Some(entry) = self.read()? {
            return Ok(SummaryReading {
                summary: entry.data,
                computed_at: entry.timestamp,
                cached: true,
            });
        }

        info!("Category cache miss, running full scan");
        let summary = aggregator.aggregate().await?;
        let entry = self.write(&summary)?;

        Ok(SummaryReading {
            summary: entry.data,
            computed_at: entry.timestamp,
            cached: false,
        })
    }

    /// Manual refresh: drop the entry, then recompute.
    pub async fn refresh(&self, aggregator: &CategoryAggregator) -> Result<SummaryReading> {
        self.invalidate()?;
        self.get_or_refresh(aggregator).await
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::testing::FakeSource;
    use crate::cache::slot::MemorySlot;
    use crate::db::schemas::VideoDoc;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_millis(3_600_000);

    fn cache() -> FreshnessCache {
        FreshnessCache::new(Box::new(MemorySlot::default()), TTL)
    }

    fn summary(pairs: &[(&str, u64)]) -> CategorySummary {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_write_then_read_within_ttl_round_trips() {
        let cache = cache();
        let s = summary(&[("Systems", 2), ("Unknown", 1)]);

        cache.write_at(&s, 0).unwrap();
        let entry = cache.read_at(1000).unwrap().expect("fresh entry");
        assert_eq!(entry.data, s);
        assert_eq!(entry.timestamp, 0);
    }

    #[test]
    fn test_read_past_ttl_misses() {
        let cache = cache();
        cache.write_at(&summary(&[("Systems", 2)]), 0).unwrap();

        assert!(cache.read_at(3_599_999).unwrap().is_some());
        assert!(cache.read_at(3_600_000).unwrap().is_none());
        assert!(cache.read_at(3_700_000).unwrap().is_none());
    }

    #[test]
    fn test_invalidate_guarantees_miss() {
        let cache = cache();
        cache.write_at(&summary(&[("Systems", 2)]), 0).unwrap();

        cache.invalidate().unwrap();
        assert!(cache.read_at(1).unwrap().is_none());
    }

    #[test]
    fn test_undecodable_entry_is_a_miss() {
        let slot = MemorySlot::default();
        slot.set(CATEGORY_CACHE_KEY, "not json").unwrap();

        let cache = FreshnessCache::new(Box::new(slot), TTL);
        assert!(cache.read_at(0).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hit_does_not_contact_aggregator() {
        let source = Arc::new(FakeSource::default());
        source.push_videos(vec![VideoDoc {
            id: "v1".into(),
            category: Some("Systems".into()),
            ..Default::default()
        }]);
        let aggregator = CategoryAggregator::new(Arc::clone(&source) as Arc<dyn crate::activity::ActivitySource>);

        let cache = cache();
        let first = cache.get_or_refresh(&aggregator).await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.summary.get("Systems"), Some(&1));

        // Mutating the collection must not show up while the entry is fresh
        source.push_videos(vec![VideoDoc {
            id: "v2".into(),
            category: Some("Systems".into()),
            ..Default::default()
        }]);

        let second = cache.get_or_refresh(&aggregator).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.summary.get("Systems"), Some(&1));
    }

    #[tokio::test]
    async fn test_refresh_recomputes() {
        let source = Arc::new(FakeSource::default());
        source.push_videos(vec![VideoDoc {
            id: "v1".into(),
            category: Some("Systems".into()),
            ..Default::default()
        }]);
        let aggregator = CategoryAggregator::new(Arc::clone(&source) as Arc<dyn crate::activity::ActivitySource>);

        let cache = cache();
        cache.get_or_refresh(&aggregator).await.unwrap();

        source.push_videos(vec![VideoDoc {
            id: "v2".into(),
            category: Some("Theory".into()),
            ..Default::default()
        }]);

        let refreshed = cache.refresh(&aggregator).await.unwrap();
        assert!(!refreshed.cached);
        assert_eq!(refreshed.summary.values().sum::<u64>(), 2);
    }
}
