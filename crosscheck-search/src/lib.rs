//! # crosscheck-search
//!
//! Keyless web search and page scraping for answer cross-checking.
//!
//! Public search engines are scraped directly, so there are no API keys
//! and no external services to configure.
//!
//! ## Design
//!
//! - Engines are tried one at a time in priority order (Bing, SearX,
//!   DuckDuckGo, then Google through a headless browser); the first
//!   non-empty answer wins
//! - Results are filtered, deduplicated by normalised URL and re-ranked
//! - Each result page can be fetched directly or, failing that, rendered
//!   in headless Chromium, then reduced to cleaned text
//! - Transient HTTP failures are retried with jittered backoff, and a
//!   per-engine circuit breaker skips engines that keep failing
//! - Nothing here returns an error past the orchestrator: failures degrade
//!   to fewer or empty results
//!
//! ## Privacy
//!
//! Query text is logged at trace level only.

pub mod browser;
pub mod circuit_breaker;
pub mod clean;
pub mod config;
pub mod dates;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod orchestrator;
pub mod retry;
pub mod selectors;
pub mod types;
pub mod url_filter;

pub use browser::{BrowserSession, PageCookie};
pub use config::SearchConfig;
pub use engine::SearchEngineTrait;
pub use error::{Result, SearchError};
pub use fetcher::PageFetcher;
pub use orchestrator::SearchOrchestrator;
pub use retry::RetryPolicy;
pub use types::{
    ContentSource, EnrichedResult, FetchMethod, FetchStatus, ScrapedContent, SearchEngine,
    SearchResult,
};
pub use url_filter::UrlFilter;

/// Run one search with a throwaway orchestrator and return up to
/// `config.max_results` results.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Engine failures
/// never surface here; they yield an empty list.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> crosscheck_search::Result<()> {
/// let config = crosscheck_search::SearchConfig::default();
/// let results = crosscheck_search::search("what is ebitda", config).await?;
/// for result in &results {
///     println!("{}. {} ({})", result.rank, result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: SearchConfig) -> Result<Vec<SearchResult>> {
    let orchestrator = SearchOrchestrator::new(config)?;
    let results = orchestrator.search(query).await;
    orchestrator.shutdown().await;
    Ok(results)
}

/// Search and fetch the page behind every result.
///
/// # Errors
///
/// Same as [`search`].
pub async fn search_and_enrich(
    query: &str,
    num_results: usize,
    config: SearchConfig,
) -> Result<Vec<EnrichedResult>> {
    let orchestrator = SearchOrchestrator::new(config)?;
    let results = orchestrator.search_and_enrich(query, num_results).await;
    orchestrator.shutdown().await;
    Ok(results)
}
