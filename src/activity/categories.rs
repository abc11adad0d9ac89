//! Category aggregation
//!
//! Walks every video record and bucket-counts by category. This is a full
//! collection scan, O(collection size) per call; callers are expected to
//! front it with the freshness cache rather than hit it on every request.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::activity::source::ActivitySource;
use crate::types::Result;

/// Category name -> video count. Counts always sum to the number of
/// records scanned.
pub type CategorySummary = BTreeMap<String, u64>;

/// Full-scan category counter over the videos collection.
pub struct CategoryAggregator {
    source: Arc<dyn ActivitySource>,
}

impl CategoryAggregator {
    pub fn new(source: Arc<dyn ActivitySource>) -> Self {
        Self { source }
    }

    /// Scan all videos and count per category bucket. Records without a
    /// usable category land in the `"Unknown"` bucket; an empty collection
    /// yields an empty summary.
    pub async fn aggregate(&self) -> Result<CategorySummary> {
        let videos = self.source.scan_videos().await?;
        let scanned = videos.len();

        let mut summary = CategorySummary::new();
        for video in &videos {
            *summary.entry(video.category_bucket().to_string()).or_insert(0) += 1;
        }

        debug!(
            "Aggregated {} videos into {} categories",
            scanned,
            summary.len()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::testing::FakeSource;
    use crate::db::schemas::{VideoDoc, UNKNOWN_CATEGORY};

    fn video(id: &str, category: Option<&str>) -> VideoDoc {
        VideoDoc {
            id: id.into(),
            category: category.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_counts_sum_to_scanned_records() {
        let source = Arc::new(FakeSource::default());
        source.push_videos(vec![
            video("v1", Some("Systems")),
            video("v2", Some("Systems")),
            video("v3", Some("Theory")),
            video("v4", None),
            video("v5", Some("")),
        ]);

        let aggregator = CategoryAggregator::new(source);
        let summary = aggregator.aggregate().await.unwrap();

        assert_eq!(summary.get("Systems"), Some(&2));
        assert_eq!(summary.get("Theory"), Some(&1));
        assert_eq!(summary.get(UNKNOWN_CATEGORY), Some(&2));
        assert_eq!(summary.values().sum::<u64>(), 5);
    }

    #[tokio::test]
    async fn test_empty_collection_yields_empty_summary() {
        let source = Arc::new(FakeSource::default());
        let aggregator = CategoryAggregator::new(source);

        let summary = aggregator.aggregate().await.unwrap();
        assert!(summary.is_empty());
    }
}
