//! Upstream recommendation service client
//!
//! The gateway does not interpret recommendation payloads; it forwards the
//! upstream status and body verbatim, success or failure, so the dashboard
//! sees exactly what the retrieval service said. Only a transport-level
//! failure to reach the upstream becomes a gateway error.

use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

use crate::types::{Result, VantageError};

/// What the upstream answered, passed through untouched.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Bytes,
}

/// Client for the retrieval endpoint of the recommendation service.
pub struct RecommenderClient {
    base_url: String,
    http: reqwest::Client,
}

impl RecommenderClient {
    pub fn new(base_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| VantageError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// `GET <base>/retrieval?user_id=&limit=&simple_format=true`
    pub async fn retrieve(&self, user_id: &str, limit: i64) -> Result<UpstreamReply> {
        let url = format!("{}/retrieval", self.base_url);

        debug!("Proxying recommendation request for {} (limit {})", user_id, limit);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("user_id", user_id),
                ("limit", &limit.to_string()),
                ("simple_format", "true"),
            ])
            .send()
            .await
            .map_err(|e| VantageError::Upstream(format!("Recommendation service unreachable: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| VantageError::Upstream(format!("Failed to read upstream body: {e}")))?;

        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_normalized() {
        let client = RecommenderClient::new("http://reco.internal/".to_string()).unwrap();
        assert_eq!(client.base_url, "http://reco.internal");
    }
}
