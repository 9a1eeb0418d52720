//! SearX/SearXNG public instances via the JSON API.
//!
//! Public instances come and go, rate-limit aggressively and often disable
//! the JSON format. Each instance gets one short-timeout attempt; any
//! failure, or an answer with no usable results, moves on to the next one.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{finalize_hits, RawHit};
use crate::config::SearchConfig;
use crate::dates::normalize_date;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::http;
use crate::types::{SearchEngine, SearchResult};

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxItem>,
}

#[derive(Debug, Deserialize)]
struct SearxItem {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, rename = "publishedDate")]
    published_date: Option<String>,
}

/// SearX JSON client cycling through configured instances.
#[derive(Debug)]
pub struct SearxEngine {
    client: reqwest::Client,
    config: Arc<SearchConfig>,
}

impl SearxEngine {
    pub fn new(client: reqwest::Client, config: Arc<SearchConfig>) -> Self {
        Self { client, config }
    }

    async fn query_instance(
        &self,
        instance: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let endpoint = format!("{}/search", instance.trim_end_matches('/'));
        let safe_search = if self.config.safe_search { "1" } else { "0" };
        let request = self
            .client
            .get(&endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("language", "en"),
                ("safesearch", safe_search),
            ])
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(Duration::from_secs(self.config.searx_timeout_seconds));

        let body = http::fetch_text(request, instance).await?;
        let hits = parse_searx_json(&body)?;
        Ok(finalize_hits(
            hits,
            SearchEngine::SearX,
            &self.config.url_filter,
            limit,
        ))
    }
}

impl SearchEngineTrait for SearxEngine {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "SearX search");

        let mut last_error = None;
        let mut answered = false;

        for instance in &self.config.searx_instances {
            match self.query_instance(instance, query, limit).await {
                Ok(results) if !results.is_empty() => {
                    tracing::debug!(instance = %instance, count = results.len(), "SearX instance answered");
                    return Ok(results);
                }
                Ok(_) => {
                    answered = true;
                    tracing::debug!(instance = %instance, "SearX instance returned no usable results");
                }
                Err(e) => {
                    tracing::warn!(instance = %instance, error = %e, "SearX instance failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e),
            _ => Ok(Vec::new()),
        }
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::SearX
    }
}

/// Parse a SearX JSON response body into raw hits.
pub(crate) fn parse_searx_json(body: &str) -> Result<Vec<RawHit>, SearchError> {
    let response: SearxResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("SearX JSON: {e}")))?;

    Ok(response
        .results
        .into_iter()
        .map(|item| RawHit {
            title: item.title,
            url: item.url,
            snippet: item.content.unwrap_or_default(),
            published_date: item.published_date.as_deref().and_then(normalize_date),
        })
        .collect())
}
