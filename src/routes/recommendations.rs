//! Recommendation proxy endpoint
//!
//! Pure pass-through: the upstream's status and body are forwarded as-is
//! in both the success and failure cases, so an unexpected upstream
//! envelope reaches the dashboard unsynthesized.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;

use crate::activity::DEFAULT_INTERACTION_LIMIT;
use crate::routes::{failure_response, service_unavailable};
use crate::server::AppState;

/// GET /users/:id/recommendations?limit=N
pub async fn handle_recommendations(
    state: Arc<AppState>,
    user_id: &str,
    limit: Option<i64>,
) -> Response<Full<Bytes>> {
    let Some(recommender) = state.recommender.as_ref() else {
        return service_unavailable("Recommendation service not configured");
    };

    let limit = match limit {
        Some(n) if n > 0 => n,
        _ => DEFAULT_INTERACTION_LIMIT,
    };

    match recommender.retrieve(user_id, limit).await {
        Ok(reply) => Response::builder()
            .status(StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY))
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(Full::new(reply.body))
            .unwrap(),
        Err(e) => failure_response(&e),
    }
}
