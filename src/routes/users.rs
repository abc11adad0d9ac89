//! User listing for the dashboard selector.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::{failure_response, json_response, service_unavailable};
use crate::server::AppState;

/// Wire shape for a dashboard user entry
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntry {
    pub user_id: String,
    pub display_name: String,
}

/// GET /users
pub async fn handle_list_users(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let Some(source) = state.source.as_ref() else {
        return service_unavailable("Document store not connected");
    };

    match source.list_users().await {
        Ok(users) => {
            let entries: Vec<UserEntry> = users
                .iter()
                .map(|u| UserEntry {
                    user_id: u.user_id.clone(),
                    display_name: u.display_name().to_string(),
                })
                .collect();
            json_response(StatusCode::OK, &entries)
        }
        Err(e) => failure_response(&e),
    }
}
