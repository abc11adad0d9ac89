//! Video category breakdown, served through the freshness cache.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::activity::{CategoryAggregator, CategorySummary};
use crate::routes::{failure_response, json_response, service_unavailable};
use crate::server::AppState;

/// Wire shape for the category breakdown
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesResponse {
    pub categories: CategorySummary,
    /// Total videos behind the counts
    pub total: u64,
    /// Whether this reading came from the cache
    pub cached: bool,
    /// When the underlying scan ran, epoch millis
    pub computed_at: i64,
}

/// GET /video-categories[?refresh=true]
///
/// Cache hit: served without touching the videos collection. Miss or
/// explicit refresh: full scan, stored, then served. A failed scan is
/// surfaced as an error; an expired entry is never served in its place.
pub async fn handle_video_categories(state: Arc<AppState>, refresh: bool) -> Response<Full<Bytes>> {
    let Some(source) = state.source.clone() else {
        return service_unavailable("Document store not connected");
    };

    let aggregator = CategoryAggregator::new(source);
    let reading = if refresh {
        state.category_cache.refresh(&aggregator).await
    } else {
        state.category_cache.get_or_refresh(&aggregator).await
    };

    match reading {
        Ok(reading) => {
            let total = reading.summary.values().sum();
            json_response(
                StatusCode::OK,
                &CategoriesResponse {
                    categories: reading.summary,
                    total,
                    cached: reading.cached,
                    computed_at: reading.computed_at,
                },
            )
        }
        Err(e) => failure_response(&e),
    }
}
