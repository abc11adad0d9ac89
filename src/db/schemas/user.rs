//! User document schema
//!
//! Identity lives in `user_id`; the display name resolves through an
//! ordered list of candidate fields and finally falls back to the id.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<ObjectId>,

    /// User identifier (collection key)
    pub user_id: String,

    /// Preferred display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Full name, used when no display name is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email, last resort before the raw id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserDoc {
    /// Resolve the name shown on the dashboard.
    ///
    /// Fallback chain: display_name, name, email, then the id itself.
    /// Empty strings count as unset.
    pub fn display_name(&self) -> &str {
        [&self.display_name, &self.name, &self.email]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or(&self.user_id)
    }
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_display_name() {
        let user = UserDoc {
            user_id: "u1".into(),
            display_name: Some("Annika".into()),
            name: Some("Annika Berg".into()),
            email: Some("annika@example.com".into()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "Annika");
    }

    #[test]
    fn test_display_name_skips_empty_candidates() {
        let user = UserDoc {
            user_id: "u1".into(),
            display_name: Some(String::new()),
            name: None,
            email: Some("annika@example.com".into()),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "annika@example.com");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let user = UserDoc {
            user_id: "u1".into(),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "u1");
    }
}
