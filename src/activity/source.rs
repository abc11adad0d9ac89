//! Document-store capability consumed by the activity pipeline.
//!
//! The pipeline never talks to MongoDB directly; it goes through this
//! trait so tests can substitute an in-memory fake and the query-engine
//! constraints stay visible in one place.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::db::schemas::{InteractionDoc, UserDoc, VideoDoc};
use crate::types::Result;

/// Maximum number of values the backing query engine accepts in a single
/// equality-set ("IN") lookup. Batches above this size are rejected.
pub const MAX_IN_VALUES: usize = 10;

/// Default window size for recent-interaction queries.
pub const DEFAULT_INTERACTION_LIMIT: i64 = 20;

/// A change notification for a user's interaction window. Carries no
/// payload; receivers re-read the window and re-join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionChange;

/// Store capability over the users, interactions, and videos collections.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// All users, for the dashboard selector.
    async fn list_users(&self) -> Result<Vec<UserDoc>>;

    /// The `limit` most recent interactions for a user, time descending.
    /// An unknown or inactive user yields an empty vec, never an error.
    async fn recent_interactions(&self, user_id: &str, limit: i64) -> Result<Vec<InteractionDoc>>;

    /// One bounded equality-set lookup on the videos collection.
    ///
    /// `ids` must hold at most [`MAX_IN_VALUES`] entries; batching across
    /// that cap is the joiner's job, not the store's.
    async fn videos_by_ids(&self, ids: &[String]) -> Result<Vec<VideoDoc>>;

    /// Every video record, unfiltered and unprojected.
    async fn scan_videos(&self) -> Result<Vec<VideoDoc>>;

    /// Live notifications for a user's interaction set. Each item signals
    /// that the window may have changed; an `Err` item is terminal.
    async fn watch_interactions(
        &self,
        user_id: &str,
    ) -> Result<BoxStream<'static, Result<InteractionChange>>>;
}
