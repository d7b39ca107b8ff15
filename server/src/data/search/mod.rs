//! Search cluster service (document backend)
//!
//! Talks to an Elasticsearch-compatible cluster over HTTP. Only the `_count`
//! API is used: usage counts are a `term` query on `project_id`.

pub mod error;

pub use error::SearchError;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::core::config::SearchConfig;
use crate::core::constants::{APP_NAME, SEARCH_REQUEST_TIMEOUT_SECS};
use crate::data::error::DataError;
use crate::data::traits::CountBackend;
use crate::data::types::CountScope;

const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// Search cluster service
pub struct SearchService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SearchService {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SearchError::InvalidUrl(config.url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEARCH_REQUEST_TIMEOUT_SECS))
            .user_agent(format!("{}/{}", APP_NAME, CURRENT_VERSION))
            .build()?;

        tracing::debug!(url = %base_url, "SearchService initialized");

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Count documents of one project in the scope's index
    pub async fn count_documents(&self, scope: &CountScope<'_>) -> Result<u64, SearchError> {
        let url = format!("{}/{}/_count", self.base_url, scope.target);
        let body = json!({ "query": { "term": { "project_id": scope.project_id } } });

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref api_key) = self.api_key {
            request = request.header("Authorization", format!("ApiKey {}", api_key));
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                index: scope.target.to_string(),
                body,
            });
        }

        let parsed: CountResponse = resp.json().await?;
        tracing::trace!(
            project_id = %scope.project_id,
            metric = %scope.metric,
            count = parsed.count,
            "Search count"
        );
        Ok(parsed.count)
    }
}

#[async_trait]
impl CountBackend for SearchService {
    fn backend_name(&self) -> &'static str {
        "search"
    }

    async fn count(&self, scope: CountScope<'_>) -> Result<u64, DataError> {
        self.count_documents(&scope).await.map_err(Into::into)
    }
}
