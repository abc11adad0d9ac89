//! Video metadata document schema
//!
//! Denormalized content records looked up by `id` during the join. This
//! core never mutates them; unknown fields are preserved verbatim so the
//! dashboard sees whatever the ingest side wrote.

use std::collections::BTreeMap;

use bson::{doc, Bson, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for video metadata
pub const VIDEO_COLLECTION: &str = "videos";

/// Bucket name used when a video has no usable category
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Video metadata document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VideoDoc {
    /// MongoDB document ID, hidden from dashboard payloads
    #[serde(rename = "_id", skip_serializing, default)]
    pub mongo_id: Option<bson::oid::ObjectId>,

    /// Video identifier (lookup key for the join)
    pub id: String,

    /// Title
    #[serde(default)]
    pub title: String,

    /// Category for the dashboard breakdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Author block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<VideoAuthor>,

    /// Media block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<VideoMedia>,

    /// Any further fields the ingest pipeline stored
    #[serde(flatten)]
    pub extra: BTreeMap<String, Bson>,
}

/// Nested author metadata
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VideoAuthor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Nested media metadata
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VideoMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
}

impl VideoDoc {
    /// Category bucket for aggregation: the category field, or
    /// [`UNKNOWN_CATEGORY`] when it is absent or empty.
    pub fn category_bucket(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => UNKNOWN_CATEGORY,
        }
    }
}

impl IntoIndexes for VideoDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("video_id_unique".to_string())
                        .build(),
                ),
            ),
            // Supports ad-hoc category drill-downs from the dashboard
            (
                doc! { "category": 1 },
                Some(
                    IndexOptions::builder()
                        .name("category_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_bucket() {
        let mut video = VideoDoc {
            id: "v1".into(),
            title: "A".into(),
            category: Some("Systems".into()),
            ..Default::default()
        };
        assert_eq!(video.category_bucket(), "Systems");

        video.category = Some(String::new());
        assert_eq!(video.category_bucket(), UNKNOWN_CATEGORY);

        video.category = None;
        assert_eq!(video.category_bucket(), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let json = serde_json::json!({
            "id": "v1",
            "title": "A",
            "duration_seconds": 90,
            "language": "en",
        });

        let video: VideoDoc = serde_json::from_value(json).unwrap();
        assert_eq!(video.id, "v1");
        assert!(video.extra.contains_key("duration_seconds"));
        assert!(video.extra.contains_key("language"));

        let back = serde_json::to_value(&video).unwrap();
        assert_eq!(back.get("language").unwrap(), "en");
    }
}
