//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the engine priority list, timeouts, politeness
//! delays, retry policy, URL filtering and the headless-browser fallback.
//! The defaults are tuned for polite, low-detection scraping rather than
//! latency.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::SearchError;
use crate::retry::RetryPolicy;
use crate::types::SearchEngine;
use crate::url_filter::UrlFilter;

/// Public SearX instances tried in order.
pub const DEFAULT_SEARX_INSTANCES: &[&str] = &[
    "https://searx.be",
    "https://search.sapti.me",
    "https://searx.tiekoetter.com",
    "https://priv.au",
    "https://search.inetol.net",
];

/// Configuration for one orchestrator instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Engines in fallback priority order. The first non-empty answer wins.
    pub engines: Vec<SearchEngine>,
    /// Default number of results when the caller does not pass one.
    pub max_results: usize,
    /// Per-request timeout for engine queries, in seconds.
    pub timeout_seconds: u64,
    /// Per-instance timeout for SearX JSON queries, in seconds.
    pub searx_timeout_seconds: u64,
    /// Timeout for direct page fetches, in seconds.
    pub page_timeout_seconds: u64,
    /// Seconds to wait for Google's results container to render.
    pub google_wait_seconds: u64,
    /// Character cap on scraped page content.
    pub max_content_chars: usize,
    /// Random delay range in milliseconds `(min, max)` before each page fetch.
    pub fetch_delay_ms: (u64, u64),
    /// Random delay range in milliseconds between enrichment fetches.
    pub enrich_delay_ms: (u64, u64),
    /// Random settle time in milliseconds after a browser navigation.
    pub render_settle_ms: (u64, u64),
    /// Whether to request safe search from engines that support it.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list.
    pub user_agent: Option<String>,
    /// HTTP(S) proxy for engine queries, page fetches and the browser.
    pub proxy: Option<String>,
    /// SearX instances, tried in order.
    pub searx_instances: Vec<String>,
    /// Base URLs of the HTML engines.
    pub endpoints: EngineEndpoints,
    /// Backoff policy for transient engine failures.
    pub retry: RetryPolicy,
    /// Which URLs may be surfaced or scraped.
    pub url_filter: UrlFilter,
    /// Headless-browser fallback settings.
    pub browser: BrowserSettings,
    /// Per-engine failure tracking across calls on one orchestrator.
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engines: SearchEngine::all().to_vec(),
            max_results: 5,
            timeout_seconds: 10,
            searx_timeout_seconds: 5,
            page_timeout_seconds: 15,
            google_wait_seconds: 8,
            max_content_chars: 5000,
            fetch_delay_ms: (500, 1500),
            enrich_delay_ms: (1000, 2000),
            render_settle_ms: (2000, 4000),
            safe_search: true,
            user_agent: None,
            proxy: None,
            searx_instances: DEFAULT_SEARX_INSTANCES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            endpoints: EngineEndpoints::default(),
            retry: RetryPolicy::default(),
            url_filter: UrlFilter::default(),
            browser: BrowserSettings::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Search endpoints for the HTML-scraped engines.
///
/// Overridable so tests can point adapters at a local mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineEndpoints {
    /// Bing results page.
    pub bing: String,
    /// DuckDuckGo HTML-only endpoint.
    pub duckduckgo: String,
    /// DuckDuckGo instant-answer API, asked when the HTML page is empty.
    pub duckduckgo_api: String,
    /// Google results page (browser-rendered).
    pub google: String,
}

impl Default for EngineEndpoints {
    fn default() -> Self {
        Self {
            bing: "https://www.bing.com/search".into(),
            duckduckgo: "https://html.duckduckgo.com/html/".into(),
            duckduckgo_api: "https://api.duckduckgo.com/".into(),
            google: "https://www.google.com/search".into(),
        }
    }
}

/// Headless-browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Set to `false` to disable the Google adapter and the fetch fallback.
    pub enabled: bool,
    /// Explicit Chrome/Chromium binary. `None` lets the driver search `PATH`.
    pub executable: Option<PathBuf>,
    /// Viewport size; a common desktop resolution blends in.
    pub window_size: (u32, u32),
    /// Seconds allowed for the browser to launch.
    pub launch_timeout_seconds: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            executable: None,
            window_size: (1366, 768),
            launch_timeout_seconds: 20,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` and `max_content_chars` must be greater than 0
    /// - every timeout must be greater than 0
    /// - `engines` must not be empty or contain duplicates
    /// - each delay range must have `min <= max`
    /// - SearX needs at least one instance when enabled
    /// - the retry policy must allow at least one attempt
    /// - a proxy, if set, must be an `http` or `https` URL with a host
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.max_content_chars == 0 {
            return Err(SearchError::Config(
                "max_content_chars must be greater than 0".into(),
            ));
        }
        for (name, value) in [
            ("timeout_seconds", self.timeout_seconds),
            ("searx_timeout_seconds", self.searx_timeout_seconds),
            ("page_timeout_seconds", self.page_timeout_seconds),
            ("google_wait_seconds", self.google_wait_seconds),
        ] {
            if value == 0 {
                return Err(SearchError::Config(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        if self.engines.is_empty() {
            return Err(SearchError::Config(
                "at least one engine must be enabled".into(),
            ));
        }
        for (i, engine) in self.engines.iter().enumerate() {
            if self.engines[..i].contains(engine) {
                return Err(SearchError::Config(format!(
                    "engine {engine} listed more than once"
                )));
            }
        }
        for (name, (min, max)) in [
            ("fetch_delay_ms", self.fetch_delay_ms),
            ("enrich_delay_ms", self.enrich_delay_ms),
            ("render_settle_ms", self.render_settle_ms),
        ] {
            if min > max {
                return Err(SearchError::Config(format!(
                    "{name} min must be <= max"
                )));
            }
        }
        if self.engines.contains(&SearchEngine::SearX) && self.searx_instances.is_empty() {
            return Err(SearchError::Config(
                "searx_instances must not be empty when SearX is enabled".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(SearchError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if let Some(proxy) = &self.proxy {
            let parsed = url::Url::parse(proxy)
                .map_err(|e| SearchError::Config(format!("invalid proxy `{proxy}`: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(SearchError::Config(format!(
                    "proxy `{proxy}` must be an http or https URL"
                )));
            }
        }
        Ok(())
    }

    /// A configuration with every politeness delay and retry backoff zeroed.
    ///
    /// Intended for tests and local mock servers; never point it at real engines.
    pub fn without_delays(mut self) -> Self {
        self.fetch_delay_ms = (0, 0);
        self.enrich_delay_ms = (0, 0);
        self.render_settle_ms = (0, 0);
        self.retry.base_delay_ms = 0;
        self
    }
}
