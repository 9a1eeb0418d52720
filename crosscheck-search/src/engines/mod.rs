//! Search engine adapters.
//!
//! Each adapter turns a query into raw hits its own way (plain GET, JSON
//! API, HTML form POST, headless browser) and then hands them to
//! [`finalize_hits`], so every engine's output obeys the same rules.

pub mod bing;
pub mod duckduckgo;
pub mod google;
pub mod searx;

pub use bing::BingEngine;
pub use duckduckgo::DuckDuckGoEngine;
pub use google::GoogleEngine;
pub use searx::SearxEngine;

use std::collections::HashSet;
use std::sync::Arc;

use crate::browser::BrowserSession;
use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::orchestrator::url_normalize::normalize_url;
use crate::types::{SearchEngine, SearchResult};
use crate::url_filter::{domain_of, UrlFilter};

/// A hit as scraped, before filtering and ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub published_date: Option<String>,
}

/// Uniform post-processing of one engine's raw hits.
///
/// Drops items with an empty title or link, drops URLs the filter rejects,
/// keeps the first of any URLs that normalise to the same form, then ranks
/// the survivors 1, 2, 3, … and caps them at `limit`.
pub fn finalize_hits(
    hits: Vec<RawHit>,
    engine: SearchEngine,
    filter: &UrlFilter,
    limit: usize,
) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter_map(|hit| {
            let title = hit.title.trim();
            let url = hit.url.trim();
            if title.is_empty() || url.is_empty() || !filter.accept(url) {
                return None;
            }
            if !seen.insert(normalize_url(url)) {
                return None;
            }
            Some(RawHit {
                title: title.to_owned(),
                url: url.to_owned(),
                snippet: hit.snippet.trim().to_owned(),
                published_date: hit.published_date,
            })
        })
        .take(limit)
        .enumerate()
        .map(|(i, hit)| SearchResult {
            domain: domain_of(&hit.url),
            url: hit.url,
            title: hit.title,
            snippet: hit.snippet,
            rank: i + 1,
            engine,
            published_date: hit.published_date,
        })
        .collect()
}

/// The closed set of adapters, dispatched statically.
#[derive(Debug)]
pub enum Engine {
    Bing(BingEngine),
    SearX(SearxEngine),
    DuckDuckGo(DuckDuckGoEngine),
    Google(GoogleEngine),
}

impl Engine {
    /// Build the adapter for `kind`, sharing the orchestrator's client and
    /// browser session.
    pub fn build(
        kind: SearchEngine,
        client: &reqwest::Client,
        browser: &Arc<BrowserSession>,
        config: &Arc<SearchConfig>,
    ) -> Self {
        match kind {
            SearchEngine::Bing => Self::Bing(BingEngine::new(client.clone(), Arc::clone(config))),
            SearchEngine::SearX => {
                Self::SearX(SearxEngine::new(client.clone(), Arc::clone(config)))
            }
            SearchEngine::DuckDuckGo => {
                Self::DuckDuckGo(DuckDuckGoEngine::new(client.clone(), Arc::clone(config)))
            }
            SearchEngine::Google => {
                Self::Google(GoogleEngine::new(Arc::clone(browser), Arc::clone(config)))
            }
        }
    }
}

impl SearchEngineTrait for Engine {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        match self {
            Self::Bing(e) => e.search(query, limit).await,
            Self::SearX(e) => e.search(query, limit).await,
            Self::DuckDuckGo(e) => e.search(query, limit).await,
            Self::Google(e) => e.search(query, limit).await,
        }
    }

    fn engine_type(&self) -> SearchEngine {
        match self {
            Self::Bing(_) => SearchEngine::Bing,
            Self::SearX(_) => SearchEngine::SearX,
            Self::DuckDuckGo(_) => SearchEngine::DuckDuckGo,
            Self::Google(_) => SearchEngine::Google,
        }
    }
}
