//! HTTP server implementation
//!
//! hyper http1 with TokioIo; one spawned task per connection, upgrades
//! enabled for the live WebSocket feed. Routing is a single match on
//! (method, path) with per-user paths destructured by prefix.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::activity::ActivitySource;
use crate::cache::FreshnessCache;
use crate::config::Args;
use crate::routes::{self, query_param};
use crate::services::RecommenderClient;
use crate::types::{Result, VantageError};

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Document store capability; None when MongoDB was unreachable in dev mode
    pub source: Option<Arc<dyn ActivitySource>>,
    /// Persistent TTL cache for the category summary
    pub category_cache: FreshnessCache,
    /// Upstream recommendation client, when configured
    pub recommender: Option<RecommenderClient>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        args: Args,
        source: Option<Arc<dyn ActivitySource>>,
        category_cache: FreshnessCache,
        recommender: Option<RecommenderClient>,
    ) -> Self {
        Self {
            args,
            source,
            category_cache,
            recommender,
            started_at: Instant::now(),
        }
    }
}

/// Bind and serve until the process is stopped
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr = state.args.listen;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| VantageError::Config(format!("Failed to bind {addr}: {e}")))?;

    info!("Listening on http://{}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let io = TokioIo::new(stream);
                let state = Arc::clone(&state);

                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .with_upgrades()
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", peer, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let query = query.as_deref();
    let limit = routes::parse_limit(query);

    let response = match (&method, path.as_str()) {
        (&Method::OPTIONS, _) => preflight_response(),

        (&Method::GET, "/health") | (&Method::GET, "/healthz") => {
            routes::health_check(&state)
        }

        (&Method::GET, "/users") => routes::handle_list_users(state).await,

        (&Method::GET, "/video-categories") => {
            let refresh = query_param(query, "refresh") == Some("true");
            routes::handle_video_categories(state, refresh).await
        }

        // Per-user paths: /users/:id/<section>
        (&Method::GET, p) if p.starts_with("/users/") => {
            let rest = p.strip_prefix("/users/").unwrap_or("");
            match rest.split_once('/') {
                Some((user_id, "interactions")) if !user_id.is_empty() => {
                    routes::handle_interactions(state, user_id, limit).await
                }
                Some((user_id, "interaction-summary")) if !user_id.is_empty() => {
                    routes::handle_interaction_summary(state, user_id, limit).await
                }
                Some((user_id, "activity/live")) if !user_id.is_empty() => {
                    if hyper_tungstenite::is_upgrade_request(&req) {
                        let user_id = user_id.to_string();
                        routes::handle_activity_ws(state, req, &user_id, limit).await
                    } else {
                        routes::error_response(
                            StatusCode::BAD_REQUEST,
                            "WebSocket upgrade required for the live feed",
                        )
                    }
                }
                Some((user_id, "recommendations")) if !user_id.is_empty() => {
                    routes::handle_recommendations(state, user_id, limit).await
                }
                _ => not_found_response(p),
            }
        }

        (_, p) => not_found_response(p),
    };

    Ok(to_boxed(response))
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
