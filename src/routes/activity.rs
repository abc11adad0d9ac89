//! Per-user activity endpoints
//!
//! - GET /users/:id/interactions          raw recent window
//! - GET /users/:id/interaction-summary   window joined against videos
//! - GET /users/:id/activity/live         WebSocket push of joined snapshots
//!
//! ## Live feed protocol
//!
//! Server -> client:
//! ```json
//! { "type": "snapshot", "userId": "u1", "count": 2, "interactions": [...], "timestamp": "..." }
//! { "type": "error", "message": "..." }
//! ```
//! Client -> server: `{"type": "ping"}` is answered with `{"type": "pong"}`.
//! Closing the socket cancels the subscription.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

use crate::activity::{ActivitySource, InteractionFetcher, JoinedInteraction, LiveJoinFeed};
use crate::routes::{error_response, failure_response, json_response, service_unavailable};
use crate::server::AppState;

/// WebSocket type after upgrade
type HyperWebSocket =
    hyper_tungstenite::WebSocketStream<hyper_util::rt::TokioIo<hyper::upgrade::Upgraded>>;

/// GET /users/:id/interactions?limit=N
pub async fn handle_interactions(
    state: Arc<AppState>,
    user_id: &str,
    limit: Option<i64>,
) -> Response<Full<Bytes>> {
    let Some(source) = state.source.clone() else {
        return service_unavailable("Document store not connected");
    };

    let fetcher = InteractionFetcher::new(source);
    match fetcher.recent(user_id, limit).await {
        Ok(interactions) => json_response(StatusCode::OK, &interactions),
        Err(e) => failure_response(&e),
    }
}

/// GET /users/:id/interaction-summary?limit=N
pub async fn handle_interaction_summary(
    state: Arc<AppState>,
    user_id: &str,
    limit: Option<i64>,
) -> Response<Full<Bytes>> {
    let Some(source) = state.source.clone() else {
        return service_unavailable("Document store not connected");
    };

    let fetcher = InteractionFetcher::new(source);
    match fetcher.recent_joined(user_id, limit).await {
        Ok(joined) => json_response(StatusCode::OK, &joined),
        Err(e) => failure_response(&e),
    }
}

/// GET /users/:id/activity/live (WebSocket upgrade)
pub async fn handle_activity_ws(
    state: Arc<AppState>,
    mut req: Request<Incoming>,
    user_id: &str,
    limit: Option<i64>,
) -> Response<Full<Bytes>> {
    let Some(source) = state.source.clone() else {
        return service_unavailable("Document store not connected");
    };

    let user_id = user_id.to_string();
    match hyper_tungstenite::upgrade(&mut req, None) {
        Ok((response, websocket)) => {
            tokio::spawn(async move {
                match websocket.await {
                    Ok(ws) => serve_live_feed(ws, source, user_id, limit).await,
                    Err(e) => warn!("Live feed upgrade failed: {}", e),
                }
            });
            response
        }
        Err(e) => error_response(
            StatusCode::BAD_REQUEST,
            &format!("WebSocket upgrade failed: {e}"),
        ),
    }
}

async fn serve_live_feed(
    ws: HyperWebSocket,
    source: Arc<dyn ActivitySource>,
    user_id: String,
    limit: Option<i64>,
) {
    let (mut sink, mut client) = ws.split();

    // One feed per connection: this user's generation counter is private
    // to this dashboard session.
    let feed = LiveJoinFeed::new(source);
    let mut sub = feed.subscribe(&user_id, limit);

    debug!("Live activity feed opened for {}", user_id);

    loop {
        tokio::select! {
            snapshot = sub.recv() => match snapshot {
                Some(Ok(joined)) => {
                    if sink.send(snapshot_message(&user_id, &joined)).await.is_err() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    // Terminal: report once, then close
                    let msg = serde_json::json!({ "type": "error", "message": e.to_string() });
                    let _ = sink.send(WsMessage::Text(msg.to_string())).await;
                    break;
                }
                None => break,
            },
            incoming = client.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    if text.contains("\"ping\"") {
                        let pong = serde_json::json!({ "type": "pong" });
                        if sink.send(WsMessage::Text(pong.to_string())).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!("Live feed socket error for {}: {}", user_id, e);
                    break;
                }
                _ => {}
            },
        }
    }

    sub.cancel();
    debug!("Live activity feed closed for {}", user_id);
}

fn snapshot_message(user_id: &str, joined: &[JoinedInteraction]) -> WsMessage {
    let msg = serde_json::json!({
        "type": "snapshot",
        "userId": user_id,
        "count": joined.len(),
        "interactions": joined,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    WsMessage::Text(msg.to_string())
}
