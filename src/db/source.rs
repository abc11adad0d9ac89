//! MongoDB-backed implementation of the `ActivitySource` capability.

use async_trait::async_trait;
use bson::doc;
use futures::stream::BoxStream;
use futures_util::StreamExt;
use tracing::debug;

use crate::activity::source::{ActivitySource, InteractionChange, MAX_IN_VALUES};
use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    InteractionDoc, UserDoc, VideoDoc, INTERACTION_COLLECTION, USER_COLLECTION, VIDEO_COLLECTION,
};
use crate::types::{Result, VantageError};

/// Activity source over real MongoDB collections
#[derive(Clone)]
pub struct MongoActivitySource {
    users: MongoCollection<UserDoc>,
    interactions: MongoCollection<InteractionDoc>,
    videos: MongoCollection<VideoDoc>,
}

impl MongoActivitySource {
    /// Open the three collections and apply their indexes
    pub async fn new(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            users: client.collection(USER_COLLECTION).await?,
            interactions: client.collection(INTERACTION_COLLECTION).await?,
            videos: client.collection(VIDEO_COLLECTION).await?,
        })
    }
}

#[async_trait]
impl ActivitySource for MongoActivitySource {
    async fn list_users(&self) -> Result<Vec<UserDoc>> {
        self.users.find_many(doc! {}).await
    }

    async fn recent_interactions(&self, user_id: &str, limit: i64) -> Result<Vec<InteractionDoc>> {
        self.interactions
            .find_sorted(doc! { "user_id": user_id }, doc! { "time": -1 }, limit)
            .await
    }

    async fn videos_by_ids(&self, ids: &[String]) -> Result<Vec<VideoDoc>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_IN_VALUES {
            return Err(VantageError::Internal(format!(
                "equality-set lookup of {} ids exceeds the {}-value cap",
                ids.len(),
                MAX_IN_VALUES
            )));
        }

        self.videos.find_many(doc! { "id": { "$in": ids } }).await
    }

    async fn scan_videos(&self) -> Result<Vec<VideoDoc>> {
        self.videos.scan_all().await
    }

    async fn watch_interactions(
        &self,
        user_id: &str,
    ) -> Result<BoxStream<'static, Result<InteractionChange>>> {
        // Delete events carry no fullDocument, so they cannot be matched to
        // a user here; they pass through and trigger a no-op re-read for
        // windows they did not touch.
        let pipeline = vec![doc! {
            "$match": {
                "$or": [
                    { "fullDocument.user_id": user_id },
                    { "operationType": "delete" },
                ]
            }
        }];

        let stream = self.interactions.watch(pipeline).await?;
        debug!("Opened interaction change stream for user {}", user_id);

        let mapped = stream.map(|event| match event {
            Ok(_) => Ok(InteractionChange),
            Err(e) => Err(VantageError::Subscription(format!(
                "interaction change stream error: {}",
                e
            ))),
        });

        Ok(mapped.boxed())
    }
}
