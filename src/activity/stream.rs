//! Live joined-activity feed
//!
//! A subscription re-reads and re-joins a user's interaction window every
//! time the underlying set changes, pushing fresh snapshots to the
//! consumer. Staleness across user switches is prevented with a monotonic
//! generation counter shared by all subscriptions from one feed: each
//! subscribe bumps the counter and captures a token, and a worker only
//! delivers while its token is still current. `cancel()` bumps the counter
//! and aborts the worker, so nothing can be observed past the cancel point.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::activity::join::{JoinedInteraction, VideoJoiner};
use crate::activity::source::{ActivitySource, DEFAULT_INTERACTION_LIMIT};
use crate::types::Result;

/// Buffered snapshots per subscription before backpressure kicks in
const SNAPSHOT_BUFFER: usize = 16;

/// Factory for live joined-activity subscriptions.
///
/// One feed serves one dashboard session; subscribing for a new user
/// implicitly invalidates the previous subscription.
pub struct LiveJoinFeed {
    source: Arc<dyn ActivitySource>,
    generation: Arc<AtomicU64>,
}

impl LiveJoinFeed {
    pub fn new(source: Arc<dyn ActivitySource>) -> Self {
        Self {
            source,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to joined snapshots for a user.
    ///
    /// Emits one initial snapshot, then one per change notification. An
    /// `Err` item is terminal: the worker stops and does not retry; the
    /// caller decides whether to resubscribe.
    pub fn subscribe(&self, user_id: &str, limit: Option<i64>) -> Subscription {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let limit = match limit {
            Some(n) if n > 0 => n,
            _ => DEFAULT_INTERACTION_LIMIT,
        };

        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let source = Arc::clone(&self.source);
        let generation = Arc::clone(&self.generation);
        let user_id = user_id.to_string();

        let worker_generation = Arc::clone(&generation);
        let handle = tokio::spawn(async move {
            run_subscription(source, user_id, limit, token, worker_generation, tx).await;
        });

        Subscription {
            rx,
            token,
            generation,
            handle,
            cancelled: AtomicBool::new(false),
        }
    }
}

/// A live subscription handle.
///
/// Dropping the handle cancels the subscription.
pub struct Subscription {
    rx: mpsc::Receiver<Result<Vec<JoinedInteraction>>>,
    token: u64,
    generation: Arc<AtomicU64>,
    handle: JoinHandle<()>,
    cancelled: AtomicBool,
}

impl Subscription {
    /// Next snapshot, `None` once the subscription has ended.
    pub async fn recv(&mut self) -> Option<Result<Vec<JoinedInteraction>>> {
        self.rx.recv().await
    }

    /// Cancel the subscription. Idempotent; no emission can be observed
    /// after this returns.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        // Invalidate the token first so an in-flight re-join no-ops, then
        // tear the worker down.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.handle.abort();
        debug!("Cancelled live activity subscription (token {})", self.token);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_subscription(
    source: Arc<dyn ActivitySource>,
    user_id: String,
    limit: i64,
    token: u64,
    generation: Arc<AtomicU64>,
    tx: mpsc::Sender<Result<Vec<JoinedInteraction>>>,
) {
    let joiner = VideoJoiner::new(Arc::clone(&source));

    // Initial snapshot before any change arrives
    match snapshot(&source, &joiner, &user_id, limit).await {
        Ok(joined) => {
            if !deliver(&generation, token, &tx, Ok(joined)).await {
                return;
            }
        }
        Err(e) => {
            deliver(&generation, token, &tx, Err(e)).await;
            return;
        }
    }

    let mut changes = match source.watch_interactions(&user_id).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Failed to open change stream for {}: {}", user_id, e);
            deliver(&generation, token, &tx, Err(e)).await;
            return;
        }
    };

    while let Some(event) = changes.next().await {
        if generation.load(Ordering::SeqCst) != token {
            return;
        }

        match event {
            Ok(_) => match snapshot(&source, &joiner, &user_id, limit).await {
                Ok(joined) => {
                    if !deliver(&generation, token, &tx, Ok(joined)).await {
                        return;
                    }
                }
                Err(e) => {
                    deliver(&generation, token, &tx, Err(e)).await;
                    return;
                }
            },
            Err(e) => {
                // Terminal: surface once and stop, no silent retry
                deliver(&generation, token, &tx, Err(e)).await;
                return;
            }
        }
    }

    debug!("Change stream for {} ended", user_id);
}

/// Send a payload unless the token went stale. A stale token drops its
/// payload; a send failure means the consumer went away, which ends the
/// worker either way.
async fn deliver(
    generation: &AtomicU64,
    token: u64,
    tx: &mpsc::Sender<Result<Vec<JoinedInteraction>>>,
    payload: Result<Vec<JoinedInteraction>>,
) -> bool {
    if generation.load(Ordering::SeqCst) != token {
        return false;
    }
    tx.send(payload).await.is_ok()
}

async fn snapshot(
    source: &Arc<dyn ActivitySource>,
    joiner: &VideoJoiner,
    user_id: &str,
    limit: i64,
) -> Result<Vec<JoinedInteraction>> {
    let raw = source.recent_interactions(user_id, limit).await?;
    joiner.join(raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::testing::FakeSource;
    use crate::db::schemas::{InteractionDoc, VideoDoc};
    use std::time::Duration;
    use tokio::time::timeout;

    fn interaction(id: &str, time: i64) -> InteractionDoc {
        InteractionDoc {
            interaction_id: id.into(),
            user_id: "u1".into(),
            activity: "watch".into(),
            time,
            video_id: "v1".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_initial_snapshot_emitted() {
        let source = Arc::new(FakeSource::default());
        source.push_interactions(vec![interaction("i1", 3)]);
        source.push_videos(vec![VideoDoc {
            id: "v1".into(),
            title: "A".into(),
            ..Default::default()
        }]);

        let feed = LiveJoinFeed::new(Arc::clone(&source) as Arc<dyn ActivitySource>);
        let mut sub = feed.subscribe("u1", None);

        let first = sub.recv().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].video.as_ref().unwrap().title, "A");
    }

    #[tokio::test]
    async fn test_change_triggers_rejoin() {
        let source = Arc::new(FakeSource::default());
        source.push_interactions(vec![interaction("i1", 3)]);

        let feed = LiveJoinFeed::new(Arc::clone(&source) as Arc<dyn ActivitySource>);
        let mut sub = feed.subscribe("u1", None);

        let first = sub.recv().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);

        source.wait_for_watchers(1).await;
        source.push_interactions(vec![interaction("i2", 5)]);
        source.notify_change();

        let second = sub.recv().await.unwrap().unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].interaction.time, 5);
    }

    #[tokio::test]
    async fn test_no_emission_after_cancel() {
        let source = Arc::new(FakeSource::default());
        source.push_interactions(vec![interaction("i1", 3)]);

        let feed = LiveJoinFeed::new(Arc::clone(&source) as Arc<dyn ActivitySource>);
        let mut sub = feed.subscribe("u1", None);

        // Drain the initial snapshot, let the watcher register, then cancel.
        sub.recv().await.unwrap().unwrap();
        source.wait_for_watchers(1).await;
        sub.cancel();
        sub.cancel(); // idempotent

        // A simulated post-cancel update must produce nothing.
        source.push_interactions(vec![interaction("i2", 5)]);
        source.notify_change();

        let result = timeout(Duration::from_millis(100), sub.recv()).await;
        match result {
            Ok(None) => {}
            Ok(Some(_)) => panic!("emission observed after cancel"),
            Err(_) => {} // channel still open but silent: also acceptable
        }
    }

    #[tokio::test]
    async fn test_new_subscription_invalidates_old() {
        let source = Arc::new(FakeSource::default());
        source.push_interactions(vec![interaction("i1", 3)]);

        let feed = LiveJoinFeed::new(Arc::clone(&source) as Arc<dyn ActivitySource>);
        let mut old = feed.subscribe("u1", None);
        old.recv().await.unwrap().unwrap();

        // Switching users bumps the shared generation; the old worker's
        // token goes stale before the new subscription starts.
        let mut fresh = feed.subscribe("u1", None);
        fresh.recv().await.unwrap().unwrap();

        source.wait_for_watchers(2).await;
        source.notify_change();

        let stale = timeout(Duration::from_millis(100), old.recv()).await;
        assert!(!matches!(stale, Ok(Some(Ok(_)))), "stale emission observed");
    }

    #[tokio::test]
    async fn test_stream_error_is_terminal() {
        let source = Arc::new(FakeSource::default());
        source.push_interactions(vec![interaction("i1", 3)]);

        let feed = LiveJoinFeed::new(Arc::clone(&source) as Arc<dyn ActivitySource>);
        let mut sub = feed.subscribe("u1", None);
        sub.recv().await.unwrap().unwrap();

        source.wait_for_watchers(1).await;
        source.fail_change_stream("permission denied");

        let err = sub.recv().await.unwrap();
        assert!(err.is_err());

        // Terminal: the channel closes, no retry happens.
        assert!(sub.recv().await.is_none());
    }
}
