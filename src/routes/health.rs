//! Health check endpoint
//!
//! Liveness only: returns 200 whenever the process is serving, and
//! reports whether MongoDB was reachable at startup so operators can see
//! a degraded instance at a glance.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::json_response;
use crate::server::AppState;

/// Health response for the dashboard and deploy probes
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub git_commit: &'static str,
    pub built_at: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Whether the document store was reachable at startup
    pub mongo_connected: bool,
    pub cache_ttl_ms: u64,
    pub timestamp: String,
}

/// GET /health, /healthz
pub fn health_check(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let response = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        git_commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        built_at: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        uptime: state.started_at.elapsed().as_secs(),
        mongo_connected: state.source.is_some(),
        cache_ttl_ms: state.args.cache_ttl_ms,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    json_response(StatusCode::OK, &response)
}
