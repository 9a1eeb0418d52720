//! Google, rendered through the headless browser. Last resort.
//!
//! Plain HTTP clients get consent walls and CAPTCHAs, so this adapter only
//! runs when the shared [`BrowserSession`] is available. A results page
//! that never renders within the wait budget counts as "no results".
//! Consent cookies are placed before navigation so the consent interstitial
//! is skipped.

use rand::Rng;
use scraper::Html;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use url::Url;

use super::{finalize_hits, RawHit};
use crate::browser::{BrowserSession, PageCookie, WaitFor};
use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::http;
use crate::selectors::{extract_first, ResultLayout};
use crate::types::{SearchEngine, SearchResult};

/// Either container signals that organic results have rendered.
const RESULTS_READY: &str = "#search, #rso";

/// Consent-settings cookie accepted by the consent interstitial.
const SOCS_VALUE: &str = "CAESEwgDEgk0ODAwMDAwMjIaAmVuIAEaBgiA_LSeBg";

static LAYOUTS: LazyLock<Vec<ResultLayout>> = LazyLock::new(|| {
    vec![ResultLayout::new(
        "google/rendered",
        &["div.ezO2md", "div.g", "div.tF2Cxc", "div.MjjYud"],
        &["h3", "div.DKV0Md", "span.CVA68e", "div[role=heading]"],
        &["div.yuRUbf a", "a[href]"],
        &[
            "div.VwiC3b",
            "div.MUxGbd",
            "div.aCOpRe",
            "div.yDYNvb",
            "span.aCOpRe",
            "span.FrIlee",
            "div.lyLwlc",
        ],
    )]
});

/// Browser-driven Google scraper.
#[derive(Debug)]
pub struct GoogleEngine {
    browser: Arc<BrowserSession>,
    config: Arc<SearchConfig>,
}

impl GoogleEngine {
    pub fn new(browser: Arc<BrowserSession>, config: Arc<SearchConfig>) -> Self {
        Self { browser, config }
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url, SearchError> {
        let num = limit.saturating_mul(2).clamp(10, 50).to_string();
        let mut params = vec![("q", query), ("hl", "en"), ("num", num.as_str())];
        if self.config.safe_search {
            params.push(("safe", "active"));
        }
        Url::parse_with_params(&self.config.endpoints.google, &params)
            .map_err(|e| SearchError::Config(format!("invalid Google endpoint: {e}")))
    }
}

/// `CONSENT` and `SOCS` cookies for the host of `search_url`.
///
/// A `www.` host gets a parent-domain scope so the consent subdomain sees
/// the cookies too.
pub(crate) fn consent_cookies(search_url: &Url) -> Vec<PageCookie> {
    let origin = format!("{}/", search_url.origin().ascii_serialization());
    let domain = search_url
        .host_str()
        .and_then(|host| host.strip_prefix("www."))
        .map(|parent| format!(".{parent}"));
    let consent = format!("PENDING+{}", rand::thread_rng().gen_range(100..=999));
    [("CONSENT", consent), ("SOCS", SOCS_VALUE.to_owned())]
        .into_iter()
        .map(|(name, value)| PageCookie {
            name: name.to_owned(),
            value,
            url: origin.clone(),
            domain: domain.clone(),
        })
        .collect()
}

impl SearchEngineTrait for GoogleEngine {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        if !self.browser.is_available().await {
            tracing::debug!("Google skipped, headless browser unavailable");
            return Ok(Vec::new());
        }
        tracing::trace!(query, "Google search");

        let url = self.search_url(query, limit)?;
        let wait = WaitFor {
            selector: RESULTS_READY,
            timeout: Duration::from_secs(self.config.google_wait_seconds),
        };
        let settle = http::pick_delay(self.config.render_settle_ms);

        let cookies = consent_cookies(&url);
        let html = match self
            .browser
            .render_with_cookies(url.as_str(), &cookies, Some(wait), settle)
            .await
        {
            Ok(html) => html,
            Err(SearchError::Timeout(what)) => {
                tracing::debug!(what = %what, "Google results never rendered");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let hits = parse_google_html(&html);
        let results = finalize_hits(hits, SearchEngine::Google, &self.config.url_filter, limit);
        tracing::debug!(count = results.len(), "Google results");
        Ok(results)
    }

    fn engine_type(&self) -> SearchEngine {
        SearchEngine::Google
    }
}

/// Parse a rendered Google results page.
pub(crate) fn parse_google_html(html: &str) -> Vec<RawHit> {
    let document = Html::parse_document(html);
    extract_first(&LAYOUTS, &document, resolve_href)
}

/// Unwrap `/url?q=<target>&...` links; drop other Google-internal links.
fn resolve_href(href: &str) -> Option<String> {
    let target = if href.starts_with("/url?") {
        let wrapped = Url::parse(&format!("https://www.google.com{href}")).ok()?;
        wrapped
            .query_pairs()
            .find(|(k, _)| k == "q" || k == "url")
            .map(|(_, v)| v.into_owned())?
    } else {
        href.to_owned()
    };
    (target.starts_with("http://") || target.starts_with("https://")).then_some(target)
}
