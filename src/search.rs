//! Web search collaborator.
//!
//! The pipeline only needs an ordered list of hits for a query; the
//! [`SearchProvider`] trait is that seam. [`GoogleSearch`] talks to the Google
//! Programmable Search JSON API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::data_models::SearchHit;
use crate::error::{FactCheckError, Result};

pub const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API refuses `num` outside this range.
const GOOGLE_MAX_NUM: usize = 10;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns at most `max_results` hits for `query`, in ranking order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

pub struct GoogleSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    cse_id: String,
}

impl GoogleSearch {
    pub fn new(api_key: &str, cse_id: &str, timeout: Duration) -> Result<GoogleSearch> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FactCheckError::SearchUnavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(GoogleSearch {
            client,
            endpoint: GOOGLE_SEARCH_ENDPOINT.to_string(),
            api_key: api_key.to_string(),
            cse_id: cse_id.to_string(),
        })
    }

    /// Points the client at a different base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        tracing::debug!(max_results, "google search");
        let num = max_results.clamp(1, GOOGLE_MAX_NUM).to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FactCheckError::SearchUnavailable(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FactCheckError::SearchUnavailable(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FactCheckError::SearchUnavailable(format!("response read failed: {}", e.without_url())))?;

        let mut hits = parse_search_response(&body)?;
        hits.truncate(max_results);
        tracing::debug!(count = hits.len(), "google search results parsed");
        Ok(hits)
    }
}

#[derive(Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<CustomSearchItem>,
}

#[derive(Deserialize)]
struct CustomSearchItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

/// Parses a Custom Search JSON API response body. A response without `items`
/// (no results) is an empty list, not an error.
pub fn parse_search_response(body: &str) -> Result<Vec<SearchHit>> {
    let parsed: CustomSearchResponse = serde_json::from_str(body)
        .map_err(|e| FactCheckError::SearchUnavailable(format!("unexpected response: {e}")))?;

    Ok(parsed
        .items
        .into_iter()
        .map(|item| SearchHit {
            title: item.title.unwrap_or_default(),
            url: item.link.unwrap_or_default(),
            snippet: item.snippet.unwrap_or_default(),
        })
        .collect())
}
