//! Shared HTTP client, User-Agent rotation and politeness delays.
//!
//! One [`reqwest::Client`] is built per orchestrator and shared by every
//! adapter and the page fetcher, so connections and cookies are pooled for
//! the lifetime of a request.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::SearchError;

/// Realistic desktop browser User-Agent strings.
pub(crate) const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Headers a desktop browser sends on a top-level navigation.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers
}

/// The User-Agent this configuration asks for: the custom one, or a random
/// pick from the rotation list.
pub fn user_agent_for(config: &SearchConfig) -> String {
    config
        .user_agent
        .clone()
        .unwrap_or_else(|| random_user_agent().to_owned())
}

/// Build the shared client.
///
/// Cookie store on (consent cookies survive across calls), browser-like
/// default headers, compression, a bounded redirect chain and the engine
/// timeout from `config`. Individual requests may override the timeout.
/// Every request goes through `config.proxy` when one is set.
///
/// # Errors
///
/// - [`SearchError::Config`] if the proxy URL is rejected
/// - [`SearchError::Http`] if the client cannot be constructed
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let mut builder = reqwest::Client::builder()
        .cookie_store(true)
        .default_headers(browser_headers())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(user_agent_for(config))
        .redirect(reqwest::redirect::Policy::limited(10));
    if let Some(proxy) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| SearchError::Config(format!("invalid proxy `{proxy}`: {e}")))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
}

/// A uniformly random duration within `(min_ms, max_ms)`, inclusive.
pub fn pick_delay((min_ms, max_ms): (u64, u64)) -> Duration {
    if max_ms == 0 || min_ms >= max_ms {
        return Duration::from_millis(min_ms.min(max_ms));
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
}

/// Sleep for a random duration within `range`. Zero ranges return at once.
pub async fn polite_delay(range: (u64, u64)) {
    let delay = pick_delay(range);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Send `request` and return the body of a 2xx response.
///
/// Non-2xx answers become [`SearchError::Status`] so callers can decide
/// whether to retry.
pub async fn fetch_text(
    request: reqwest::RequestBuilder,
    context: &str,
) -> Result<String, SearchError> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::from_reqwest(context, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Status {
            status: status.as_u16(),
            context: context.to_owned(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| SearchError::from_reqwest(context, e))?;
    tracing::trace!(context, bytes = body.len(), "response received");
    Ok(body)
}
