//! Bing: one GET, least likely to challenge a plain HTTP client.
//!
//! Bing sometimes wraps result links in `bing.com/ck/a?...&u=a1<base64>`
//! click-tracking redirects; those are decoded back to the target URL.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use scraper::Html;
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
    vec![
        ResultLayout::new(
            "bing/b_algo",
            &["li.b_algo"],
            &["h2", ".b_title", ".b_algoheader"],
            &["h2 a", ".b_title a", "a.tilk", "a[href]"],
            &[
                ".b_caption p",
                ".b_lineclamp2",
                ".b_lineclamp3",
                ".b_lineclamp4",
                ".b_algoSlug",
                "p",
            ],
        ),
        ResultLayout::new(
            "bing/structural",
            &["#b_results > li"],
            &["h2", "h3"],
            &["h2 a", "h3 a", "a[href^='http']"],
            &["p", ".b_caption"],
        ),
    ]
});

/// Bing HTML results scraper.
#[derive(Debug)]
pub struct BingEngine {
    client: reqwest::Client,
    config: Arc<SearchConfig>,
}

impl BingEngine {
    pub fn new(client: reqwest::Client, config: Arc<SearchConfig>) -> Self {
        Self { client, config }
    }
}

impl SearchEngineTrait for BingEngine {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Bing search");

        let safe_search = if self.config.safe_search { "Strict" } else { "Off" };
        let count = limit.saturating_mul(2).clamp(10, 50).to_string();

        let html = self
            .config
            .retry
            .run("Bing", || {
                let request = self.client.get(&self.config.endpoints.bing).query(&[
                    ("q", query),
                    ("setlang", "en"),
                    ("safeSearch", safe_search),
                    ("count", count.as_str()),
                ]);
                http::fetch_text(request, "Bing")
            })
            .await?;

        let hits = parse_bing_html(&html);
        let results = finalize_hits(hits, SearchEngine::Bing, &self.config.url_filter, limit);
        tracing::debug!(count = results.len(), "Bing results");
        Ok(results)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::Bing
    }
}

/// Parse a Bing results page, trying the `li.b_algo` layout first and the
/// structural `#b_results > li` layout second.
pub(crate) fn parse_bing_html(html: &str) -> Vec<RawHit> {
    let document = Html::parse_document(html);
    extract_first(&LAYOUTS, &document, resolve_href)
}

/// Target of a Bing result link. Relative links are Bing-internal.
fn resolve_href(href: &str) -> Option<String> {
    let parsed = Url::parse(href).ok()?;
    let is_bing = parsed
        .host_str()
        .is_some_and(|h| h == "bing.com" || h.ends_with(".bing.com"));
    if is_bing && parsed.path().starts_with("/ck/a") {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "u")
            .and_then(|(_, v)| decode_tracking_target(&v));
    }
    Some(href.to_owned())
}

/// Decode the `u` parameter of a Bing click-tracking link: an `a1` prefix
/// followed by URL-safe base64 of the target.
fn decode_tracking_target(value: &str) -> Option<String> {
    let encoded = value.strip_prefix("a1")?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .or_else(|_| STANDARD_NO_PAD.decode(encoded))
        .ok()?;
    let target = String::from_utf8(bytes).ok()?;
    target.starts_with("http").then_some(target)
}
