//! DuckDuckGo via the HTML-only endpoint.
//!
//! The endpoint takes a form POST and needs no JavaScript. Result links are
//! wrapped in `/l/?uddg=<target>` redirects, which are unwrapped here.
//! When the page parses to nothing, the instant-answer JSON API is asked
//! instead and its related topics become the results.

use scraper::Html;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use url::Url;

use super::{finalize_hits, RawHit};
use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::http;
use crate::selectors::{extract_first, ResultLayout};
use crate::types::{SearchEngine, SearchResult};

static LAYOUTS: LazyLock<Vec<ResultLayout>> = LazyLock::new(|| {
    vec![ResultLayout::new(
        "duckduckgo/html",
        &[
            ".result.results_links.results_links_deep:not(.result--ad)",
            ".web-result:not(.result--ad)",
            "div.result:not(.result--ad)",
            ".links_main",
        ],
        &[".result__a", "h2 a", "a.result-link"],
        &[".result__a", "h2 a", "a.result-link", "a.result__url"],
        &[".result__snippet", ".result-snippet", "td.result-snippet"],
    )]
});

#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(default, rename = "Heading")]
    heading: String,
    #[serde(default, rename = "AbstractText")]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default, rename = "Results")]
    results: Vec<Topic>,
    #[serde(default, rename = "RelatedTopics")]
    related_topics: Vec<Topic>,
}

/// A related topic, or a named group of them.
#[derive(Debug, Default, Deserialize)]
struct Topic {
    #[serde(default, rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(default, rename = "Text")]
    text: String,
    #[serde(default, rename = "Topics")]
    topics: Vec<Topic>,
}

/// DuckDuckGo HTML scraper.
#[derive(Debug)]
pub struct DuckDuckGoEngine {
    client: reqwest::Client,
    config: Arc<SearchConfig>,
}

impl DuckDuckGoEngine {
    pub fn new(client: reqwest::Client, config: Arc<SearchConfig>) -> Self {
        Self { client, config }
    }
}

impl DuckDuckGoEngine {
    async fn instant_answers(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let params = [
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("no_redirect", "1"),
        ];
        let body = self
            .config
            .retry
            .run("DuckDuckGo API", || {
                let request = self
                    .client
                    .get(&self.config.endpoints.duckduckgo_api)
                    .query(&params);
                http::fetch_text(request, "DuckDuckGo API")
            })
            .await?;

        Ok(finalize_hits(
            parse_instant_answers(&body)?,
            SearchEngine::DuckDuckGo,
            &self.config.url_filter,
            limit,
        ))
    }
}

impl SearchEngineTrait for DuckDuckGoEngine {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let mut form = vec![("q", query), ("kl", "us-en")];
        if self.config.safe_search {
            form.push(("kp", "1"));
        }

        let html = self
            .config
            .retry
            .run("DuckDuckGo", || {
                let request = self
                    .client
                    .post(&self.config.endpoints.duckduckgo)
                    .form(&form);
                http::fetch_text(request, "DuckDuckGo")
            })
            .await?;

        let hits = parse_duckduckgo_html(&html);
        let mut results = finalize_hits(
            hits,
            SearchEngine::DuckDuckGo,
            &self.config.url_filter,
            limit,
        );
        if results.is_empty() {
            tracing::debug!("DuckDuckGo HTML page empty, trying instant answers");
            results = match self.instant_answers(query, limit).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::debug!(error = %e, "DuckDuckGo instant answers failed");
                    Vec::new()
                }
            };
        }
        tracing::debug!(count = results.len(), "DuckDuckGo results");
        Ok(results)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::DuckDuckGo
    }
}

/// Parse a DuckDuckGo HTML results page. Ads are excluded by the selectors.
pub(crate) fn parse_duckduckgo_html(html: &str) -> Vec<RawHit> {
    let document = Html::parse_document(html);
    extract_first(&LAYOUTS, &document, extract_url)
}

/// Parse an instant-answer response.
///
/// The abstract's source comes first, then direct results, then related
/// topics with groups flattened in order. A topic's text reads
/// "Title - description"; the part before the first " - " becomes the
/// title and the whole text the snippet.
pub(crate) fn parse_instant_answers(body: &str) -> Result<Vec<RawHit>, SearchError> {
    let answer: InstantAnswer = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("DuckDuckGo API JSON: {e}")))?;
    let mut hits = Vec::new();
    if !answer.abstract_url.is_empty() {
        hits.push(RawHit {
            title: answer.heading,
            url: answer.abstract_url,
            snippet: answer.abstract_text,
            published_date: None,
        });
    }
    collect_topics(answer.results, &mut hits);
    collect_topics(answer.related_topics, &mut hits);
    Ok(hits)
}

fn collect_topics(topics: Vec<Topic>, hits: &mut Vec<RawHit>) {
    for topic in topics {
        match topic.first_url {
            Some(url) => {
                let title = topic
                    .text
                    .split_once(" - ")
                    .map_or(topic.text.as_str(), |(head, _)| head)
                    .to_owned();
                hits.push(RawHit {
                    title,
                    url,
                    snippet: topic.text,
                    published_date: None,
                });
            }
            None => collect_topics(topic.topics, hits),
        }
    }
}

/// Extract the target URL from DuckDuckGo's redirect wrapper.
///
/// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
/// Protocol-relative and site-relative forms are both accepted.
fn extract_url(href: &str) -> Option<String> {
    let full = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_owned()
    };

    let parsed = Url::parse(&full).ok()?;
    let is_ddg = parsed
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"));

    if is_ddg && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full)
    }
}
