//! Recent-interaction window fetch
//!
//! Pulls the most recent N interactions for a user, newest first. Absence
//! is ordinary: a new or inactive user simply has an empty window.

use std::sync::Arc;

use crate::activity::join::{JoinedInteraction, VideoJoiner};
use crate::activity::source::{ActivitySource, DEFAULT_INTERACTION_LIMIT};
use crate::db::schemas::InteractionDoc;
use crate::types::Result;

/// Fetches per-user interaction windows, optionally joined against videos.
pub struct InteractionFetcher {
    source: Arc<dyn ActivitySource>,
    joiner: VideoJoiner,
}

impl InteractionFetcher {
    pub fn new(source: Arc<dyn ActivitySource>) -> Self {
        let joiner = VideoJoiner::new(Arc::clone(&source));
        Self { source, joiner }
    }

    /// The `limit` most recent interactions, time descending.
    /// `None` falls back to [`DEFAULT_INTERACTION_LIMIT`].
    pub async fn recent(&self, user_id: &str, limit: Option<i64>) -> Result<Vec<InteractionDoc>> {
        let limit = effective_limit(limit);
        self.source.recent_interactions(user_id, limit).await
    }

    /// Recent window with every entry joined to its video record.
    pub async fn recent_joined(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<JoinedInteraction>> {
        let raw = self.recent(user_id, limit).await?;
        self.joiner.join(raw).await
    }
}

fn effective_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n,
        _ => DEFAULT_INTERACTION_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::testing::FakeSource;
    use crate::db::schemas::VideoDoc;

    fn interaction(id: &str, time: i64, video_id: &str) -> InteractionDoc {
        InteractionDoc {
            interaction_id: id.into(),
            user_id: "u1".into(),
            activity: "watch".into(),
            time,
            content: String::new(),
            video_id: video_id.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_window_is_not_an_error() {
        let source = Arc::new(FakeSource::default());
        let fetcher = InteractionFetcher::new(source);

        let window = fetcher.recent("nobody", None).await.unwrap();
        assert!(window.is_empty());
    }

    #[tokio::test]
    async fn test_default_limit_applied() {
        let source = Arc::new(FakeSource::default());
        source.push_interactions(
            (0..30)
                .map(|i| interaction(&format!("i{}", i), 30 - i as i64, "v1"))
                .collect(),
        );
        let fetcher = InteractionFetcher::new(Arc::clone(&source) as Arc<dyn ActivitySource>);

        let window = fetcher.recent("u1", None).await.unwrap();
        assert_eq!(window.len(), DEFAULT_INTERACTION_LIMIT as usize);

        let window = fetcher.recent("u1", Some(0)).await.unwrap();
        assert_eq!(window.len(), DEFAULT_INTERACTION_LIMIT as usize);

        let window = fetcher.recent("u1", Some(5)).await.unwrap();
        assert_eq!(window.len(), 5);
    }

    #[tokio::test]
    async fn test_joined_window_scenario() {
        // u1 has interactions at t=3 (v1) and t=1 (v2); only v1 exists.
        let source = Arc::new(FakeSource::default());
        source.push_interactions(vec![
            interaction("i1", 3, "v1"),
            interaction("i2", 1, "v2"),
        ]);
        source.push_videos(vec![VideoDoc {
            id: "v1".into(),
            title: "A".into(),
            ..Default::default()
        }]);

        let fetcher = InteractionFetcher::new(Arc::clone(&source) as Arc<dyn ActivitySource>);
        let joined = fetcher.recent_joined("u1", Some(20)).await.unwrap();

        // Two distinct ids fit one lookup batch
        assert_eq!(source.lookup_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].interaction.time, 3);
        assert_eq!(joined[0].video.as_ref().unwrap().title, "A");
        assert_eq!(joined[1].interaction.time, 1);
        assert!(joined[1].video.is_none());
    }
}
