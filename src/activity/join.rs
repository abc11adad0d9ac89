//! Batched video join
//!
//! The backing query engine caps equality-set ("IN") lookups at
//! [`MAX_IN_VALUES`] ids, so resolving a window of interactions to video
//! metadata means sharding the distinct id set into fixed-size batches,
//! issuing every batch concurrently, and merging the results into one map.
//! A failed batch fails the whole join: a partial merge would present
//! "lookup failed" as "no video found".

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::activity::source::{ActivitySource, MAX_IN_VALUES};
use crate::db::schemas::{InteractionDoc, VideoDoc};
use crate::types::Result;

/// An interaction decorated with its video record.
///
/// `video` is `null` on the wire when the referenced record does not exist
/// (a broken reference, not an error); no interaction is ever dropped for
/// a missing video.
#[derive(Debug, Clone, Serialize)]
pub struct JoinedInteraction {
    #[serde(flatten)]
    pub interaction: InteractionDoc,

    /// Matching video record, or null for a broken reference
    pub video: Option<VideoDoc>,

    /// Decoded `content` payload (parse failures become a marker, see
    /// [`InteractionDoc::decoded_content`])
    pub content_decoded: JsonValue,
}

/// Resolve `ids` to records through bounded equality-set queries.
///
/// Distinct ids are partitioned into batches of at most `batch_size`; all
/// batch futures are created before any is awaited, so total latency is
/// bounded by the slowest batch rather than their sum. Zero ids short-
/// circuits to an empty map with no query at all. Records returned by
/// later batches overwrite earlier ones idempotently.
pub async fn batched_lookup<R, F, Fut>(
    ids: impl IntoIterator<Item = String>,
    batch_size: usize,
    query_fn: F,
) -> Result<HashMap<String, R>>
where
    F: Fn(Vec<String>) -> Fut,
    Fut: Future<Output = Result<Vec<(String, R)>>>,
{
    let mut seen = HashSet::new();
    let distinct: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();

    if distinct.is_empty() {
        return Ok(HashMap::new());
    }

    let batches: Vec<_> = distinct
        .chunks(batch_size)
        .map(|chunk| query_fn(chunk.to_vec()))
        .collect();

    debug!(
        "Resolving {} distinct ids across {} lookup batches",
        distinct.len(),
        batches.len()
    );

    let results = futures::future::try_join_all(batches).await?;

    let mut merged = HashMap::with_capacity(distinct.len());
    for batch in results {
        for (id, record) in batch {
            merged.insert(id, record);
        }
    }

    Ok(merged)
}

/// Joins interaction windows against the videos collection.
pub struct VideoJoiner {
    source: Arc<dyn ActivitySource>,
}

impl VideoJoiner {
    pub fn new(source: Arc<dyn ActivitySource>) -> Self {
        Self { source }
    }

    /// Decorate every interaction with its video record (or null).
    pub async fn join(&self, interactions: Vec<InteractionDoc>) -> Result<Vec<JoinedInteraction>> {
        let source = Arc::clone(&self.source);

        let videos = batched_lookup(
            interactions.iter().map(|i| i.video_id.clone()),
            MAX_IN_VALUES,
            move |batch| {
                let source = Arc::clone(&source);
                async move {
                    let records = source.videos_by_ids(&batch).await?;
                    Ok(records.into_iter().map(|v| (v.id.clone(), v)).collect())
                }
            },
        )
        .await?;

        Ok(interactions
            .into_iter()
            .map(|interaction| {
                let video = videos.get(&interaction.video_id).cloned();
                let content_decoded = interaction.decoded_content();
                JoinedInteraction {
                    interaction,
                    video,
                    content_decoded,
                }
            })
            .collect())
    }
}
