//! HTTP routes for vantage
//!
//! Every handler returns a complete `Response<Full<Bytes>>`; the server
//! loop boxes bodies and owns the match on method/path. Responses carry
//! permissive CORS headers because the consumer is a browser dashboard on
//! another origin.

pub mod activity;
pub mod categories;
pub mod health;
pub mod recommendations;
pub mod users;

pub use activity::{handle_activity_ws, handle_interaction_summary, handle_interactions};
pub use categories::handle_video_categories;
pub use health::health_check;
pub use recommendations::handle_recommendations;
pub use users::handle_list_users;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::types::VantageError;

/// Serialize a value as a JSON response with CORS headers
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    let body = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Serialization failed: {e}"),
            )
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// JSON error body with CORS headers
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Map a pipeline error onto a transport response.
///
/// Absence never reaches here (it is empty data, not an error); what does
/// is transport and dependency failure.
pub fn failure_response(err: &VantageError) -> Response<Full<Bytes>> {
    let status = match err {
        VantageError::Database(_) | VantageError::Subscription(_) => StatusCode::BAD_GATEWAY,
        VantageError::Upstream(_) => StatusCode::BAD_GATEWAY,
        VantageError::CacheSlot(_) | VantageError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        VantageError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    error_response(status, &err.to_string())
}

/// 503 for endpoints whose backing service is not configured/connected
pub fn service_unavailable(message: &str) -> Response<Full<Bytes>> {
    error_response(StatusCode::SERVICE_UNAVAILABLE, message)
}

/// Extract a raw query parameter value (no percent-decoding; all our
/// parameters are integers or flags)
pub fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Parse `limit=N`; absent or unparseable means "use the default"
pub fn parse_limit(query: Option<&str>) -> Option<i64> {
    query_param(query, "limit").and_then(|v| v.parse().ok())
}
