//! Core search orchestrator: engine fallback, then per-result enrichment.
//!
//! One [`SearchOrchestrator`] owns the shared HTTP client, the lazily
//! launched browser session, the page fetcher and the per-engine circuit
//! breaker. None of its operations fail: engine and page errors are logged
//! and absorbed, so callers always get a (possibly empty) list.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::browser::BrowserSession;
use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::engines::Engine;
use crate::error::Result;
use crate::fetcher::PageFetcher;
use crate::http;
use crate::types::{EnrichedResult, ScrapedContent, SearchEngine, SearchResult};

use super::fallback::first_non_empty;

/// Multi-engine web search with page-content enrichment.
#[derive(Debug)]
pub struct SearchOrchestrator {
    config: Arc<SearchConfig>,
    engines: Vec<Engine>,
    browser: Arc<BrowserSession>,
    fetcher: PageFetcher,
    breaker: Mutex<CircuitBreaker>,
}

impl SearchOrchestrator {
    /// Build an orchestrator whose browser launches on first use.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Config`] if `config` fails validation,
    /// or [`crate::SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self> {
        let browser = BrowserSession::new(
            config.browser.clone(),
            http::user_agent_for(&config),
            Duration::from_secs(config.page_timeout_seconds),
        )
        .with_proxy(config.proxy.clone());
        Self::with_browser(config, Arc::new(browser))
    }

    /// Build an orchestrator around an existing browser session.
    ///
    /// Tests pass [`BrowserSession::disabled`] to keep Chromium out of the
    /// picture.
    ///
    /// # Errors
    ///
    /// Same as [`SearchOrchestrator::new`].
    pub fn with_browser(config: SearchConfig, browser: Arc<BrowserSession>) -> Result<Self> {
        config.validate()?;
        let client = http::build_client(&config)?;
        let config = Arc::new(config);

        let engines = config
            .engines
            .iter()
            .map(|kind| Engine::build(*kind, &client, &browser, &config))
            .collect();
        let fetcher = PageFetcher::new(client, Arc::clone(&browser), Arc::clone(&config));
        let breaker = Mutex::new(CircuitBreaker::new(config.circuit_breaker.clone()));

        Ok(Self {
            config,
            engines,
            browser,
            fetcher,
            breaker,
        })
    }

    /// The validated configuration this orchestrator runs with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The page fetcher, for callers that want to scrape a single URL.
    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Current circuit state of `engine`.
    pub fn engine_state(&self, engine: SearchEngine) -> CircuitState {
        self.breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state(engine)
    }

    /// Ask the configured engines in order and return the first non-empty
    /// answer: at most `num_results` items, deduplicated by normalised URL
    /// and ranked 1, 2, 3, ….
    ///
    /// Returns an empty list when every engine fails or finds nothing.
    pub async fn multi_engine_search(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        tracing::trace!(query, num_results, "multi-engine search");
        let results = first_non_empty(&self.engines, &self.breaker, query, num_results).await;
        if let Some(first) = results.first() {
            tracing::info!(engine = %first.engine, count = results.len(), "search answered");
        } else {
            tracing::warn!("all engines returned nothing");
        }
        results
    }

    /// [`SearchOrchestrator::multi_engine_search`] with the configured
    /// default result count.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.multi_engine_search(query, self.config.max_results).await
    }

    /// Fetch the page behind each result, in rank order, one at a time.
    ///
    /// A random pause separates consecutive fetches. Results whose page
    /// cannot be fetched keep their snippet (or title) as content, so the
    /// output has exactly one entry per input, in input order.
    pub async fn enrich(&self, results: Vec<SearchResult>) -> Vec<EnrichedResult> {
        self.enrich_within(results, None).await
    }

    /// [`SearchOrchestrator::enrich`] that stops fetching at `deadline`.
    ///
    /// The fetch in flight when the deadline passes is abandoned. That
    /// result and every later one keep their snippet, so nothing already
    /// found is lost.
    pub async fn enrich_until(
        &self,
        results: Vec<SearchResult>,
        deadline: Instant,
    ) -> Vec<EnrichedResult> {
        self.enrich_within(results, Some(deadline)).await
    }

    async fn enrich_within(
        &self,
        results: Vec<SearchResult>,
        deadline: Option<Instant>,
    ) -> Vec<EnrichedResult> {
        let total = results.len();
        let mut enriched = Vec::with_capacity(total);
        let mut expired = false;
        for (i, result) in results.into_iter().enumerate() {
            let page = if expired {
                ScrapedContent::failed(&result.url, "deadline reached before fetch")
            } else {
                let fetch = async {
                    if i > 0 {
                        http::polite_delay(self.config.enrich_delay_ms).await;
                    }
                    self.fetcher
                        .fetch(&result.url, self.config.max_content_chars)
                        .await
                };
                match deadline {
                    Some(at) => match tokio::time::timeout_at(at, fetch).await {
                        Ok(page) => page,
                        Err(_) => {
                            expired = true;
                            tracing::warn!(
                                fetched = i,
                                remaining = total - i,
                                "enrichment deadline reached, keeping snippets"
                            );
                            ScrapedContent::failed(&result.url, "deadline reached during fetch")
                        }
                    },
                    None => fetch.await,
                }
            };
            if !page.is_usable() {
                tracing::debug!(
                    url = %result.url,
                    error = page.error_message.as_deref().unwrap_or(""),
                    "page unavailable, using snippet"
                );
            }
            enriched.push(EnrichedResult::from_parts(result, &page));
        }
        enriched
    }

    /// Search, then enrich every result.
    pub async fn search_and_enrich(&self, query: &str, num_results: usize) -> Vec<EnrichedResult> {
        let results = self.multi_engine_search(query, num_results).await;
        if results.is_empty() {
            return Vec::new();
        }
        self.enrich(results).await
    }

    /// Close the headless browser if it was launched.
    pub async fn shutdown(&self) {
        self.browser.shutdown().await;
    }
}
