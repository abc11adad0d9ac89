//! Interaction document schema
//!
//! One record per user action on a video (watch, rate, quiz, search hit).
//! Interactions are immutable once written; `time` is the ordering key.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::db::mongo::IntoIndexes;

/// Collection name for interactions
pub const INTERACTION_COLLECTION: &str = "interactions";

/// Interaction document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct InteractionDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<ObjectId>,

    /// Interaction identifier
    pub interaction_id: String,

    /// Owning user
    pub user_id: String,

    /// Activity kind (watch, rate, quiz_attempt, ...)
    pub activity: String,

    /// Event time, epoch milliseconds (ordering key)
    pub time: i64,

    /// Activity payload; JSON-encoded or plain text depending on activity
    #[serde(default)]
    pub content: String,

    /// Referenced video id
    pub video_id: String,
}

impl InteractionDoc {
    /// Decode the `content` payload for the dashboard.
    ///
    /// JSON-encoded payloads come back parsed. A payload that looks like
    /// JSON but fails to parse yields a decode-error marker instead of
    /// aborting the surrounding batch. Anything else is plain text.
    pub fn decoded_content(&self) -> JsonValue {
        let trimmed = self.content.trim_start();

        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            match serde_json::from_str(&self.content) {
                Ok(value) => value,
                Err(_) => serde_json::json!({ "malformed": self.content }),
            }
        } else {
            JsonValue::String(self.content.clone())
        }
    }
}

impl IntoIndexes for InteractionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // The per-user recent-window query: user_id equality, time desc
            (
                doc! { "user_id": 1, "time": -1 },
                Some(
                    IndexOptions::builder()
                        .name("user_time_desc".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "interaction_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("interaction_id_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
