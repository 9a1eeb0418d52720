//! Core types: engine identity, search hits, scraped pages, enriched results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported search engines, in default fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchEngine {
    /// Bing. A single GET, least likely to challenge plain HTTP clients.
    Bing,
    /// SearX/SearXNG public aggregator instances (JSON API).
    SearX,
    /// DuckDuckGo HTML-only endpoint.
    DuckDuckGo,
    /// Google, rendered through the headless browser. Last resort.
    Google,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bing => "Bing",
            Self::SearX => "SearX",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Google => "Google",
        }
    }

    /// Whether this engine needs the headless browser to run at all.
    pub fn requires_browser(&self) -> bool {
        matches!(self, Self::Google)
    }

    /// All engines in the default priority order.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Bing, Self::SearX, Self::DuckDuckGo, Self::Google]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single search hit produced by an engine adapter.
///
/// `rank` is the 1-based position within the list it was returned in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Target URL (already passed the URL filter).
    pub url: String,
    /// Result title as shown by the engine.
    pub title: String,
    /// Engine-provided snippet; may be empty.
    pub snippet: String,
    /// 1-based position.
    pub rank: usize,
    /// Host of `url`, without a leading `www.`.
    pub domain: String,
    /// Which engine produced this hit.
    pub engine: SearchEngine,
    /// Publication date as `YYYY-MM-DD`, when the engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Outcome of a page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Content was extracted.
    Ok,
    /// Every fetch path failed; see `error_message`.
    Error,
}

/// Which fetch path produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    /// Plain HTTP GET.
    Direct,
    /// Rendered by the headless browser.
    Browser,
    /// Nothing succeeded.
    None,
}

/// Cleaned text scraped from a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedContent {
    /// The URL that was fetched.
    pub url: String,
    /// Page title, empty if none was found.
    pub title: String,
    /// Cleaned, truncated text. Empty when `status` is `Error`.
    pub content: String,
    /// Whether extraction succeeded.
    pub status: FetchStatus,
    /// Failure description when `status` is `Error`.
    pub error_message: Option<String>,
    /// Publication date harvested from page metadata, as `YYYY-MM-DD`.
    pub published_date: Option<String>,
    /// Path that produced the content.
    pub via: FetchMethod,
}

impl ScrapedContent {
    /// A failed fetch carrying only the URL and the error text.
    pub fn failed(url: &str, message: impl Into<String>) -> Self {
        Self {
            url: url.to_owned(),
            title: String::new(),
            content: String::new(),
            status: FetchStatus::Error,
            error_message: Some(message.into()),
            published_date: None,
            via: FetchMethod::None,
        }
    }

    /// True when the fetch succeeded with non-empty content.
    pub fn is_usable(&self) -> bool {
        self.status == FetchStatus::Ok && !self.content.trim().is_empty()
    }
}

/// Where an enriched result's `content` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Scraped page text.
    Page,
    /// Fell back to the engine snippet (or title when the snippet is empty).
    Snippet,
}

/// A search hit with scraped page content attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedResult {
    /// Target URL.
    pub url: String,
    /// Result title.
    pub title: String,
    /// Engine snippet.
    pub snippet: String,
    /// 1-based position in the orchestrator's result list.
    pub rank: usize,
    /// Host of `url`.
    pub domain: String,
    /// Engine that produced the hit.
    pub engine: SearchEngine,
    /// Scraped text, or the snippet/title fallback. Never empty.
    pub content: String,
    /// Provenance of `content`.
    pub content_source: ContentSource,
    /// Publication date (`YYYY-MM-DD`) from the engine or the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl EnrichedResult {
    /// Attach content to a search hit.
    ///
    /// Uses the scraped page when it is usable, otherwise the snippet, and
    /// the title when the snippet is empty too.
    pub fn from_parts(result: SearchResult, page: &ScrapedContent) -> Self {
        let (content, content_source) = if page.is_usable() {
            (page.content.clone(), ContentSource::Page)
        } else if !result.snippet.trim().is_empty() {
            (result.snippet.clone(), ContentSource::Snippet)
        } else {
            (result.title.clone(), ContentSource::Snippet)
        };

        let published_date = result
            .published_date
            .clone()
            .or_else(|| page.published_date.clone());

        Self {
            url: result.url,
            title: result.title,
            snippet: result.snippet,
            rank: result.rank,
            domain: result.domain,
            engine: result.engine,
            content,
            content_source,
            published_date,
        }
    }

    /// Short digest merging the snippet with the lead of the page content.
    ///
    /// The snippet comes first; page text is appended unless it merely
    /// repeats the snippet. The result is capped at `max_chars` characters.
    pub fn summary(&self, max_chars: usize) -> String {
        let snippet = self.snippet.trim();
        let merged = match self.content_source {
            ContentSource::Snippet => self.content.trim().to_owned(),
            ContentSource::Page if snippet.is_empty() => self.content.trim().to_owned(),
            ContentSource::Page if self.content.contains(snippet) => {
                self.content.trim().to_owned()
            }
            ContentSource::Page => format!("{snippet}\n{}", self.content.trim()),
        };
        crate::clean::truncate_chars(&merged, max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(snippet: &str) -> SearchResult {
        SearchResult {
            url: "https://example.com/a".into(),
            title: "Example".into(),
            snippet: snippet.into(),
            rank: 1,
            domain: "example.com".into(),
            engine: SearchEngine::Bing,
            published_date: None,
        }
    }

    fn page(content: &str) -> ScrapedContent {
        ScrapedContent {
            url: "https://example.com/a".into(),
            title: "Example".into(),
            content: content.into(),
            status: FetchStatus::Ok,
            error_message: None,
            published_date: Some("2024-03-01".into()),
            via: FetchMethod::Direct,
        }
    }

    #[test]
    fn search_engine_display() {
        assert_eq!(SearchEngine::Bing.to_string(), "Bing");
        assert_eq!(SearchEngine::SearX.to_string(), "SearX");
        assert_eq!(SearchEngine::DuckDuckGo.to_string(), "DuckDuckGo");
        assert_eq!(SearchEngine::Google.to_string(), "Google");
    }

    #[test]
    fn default_priority_order() {
        assert_eq!(
            SearchEngine::all(),
            &[
                SearchEngine::Bing,
                SearchEngine::SearX,
                SearchEngine::DuckDuckGo,
                SearchEngine::Google
            ]
        );
        assert!(SearchEngine::Google.requires_browser());
        assert!(!SearchEngine::Bing.requires_browser());
    }

    #[test]
    fn fetch_status_serialises_lowercase() {
        let json = serde_json::to_string(&FetchStatus::Error).expect("serialize");
        assert_eq!(json, "\"error\"");
    }

    #[test]
    fn enriched_uses_page_content_when_usable() {
        let enriched = EnrichedResult::from_parts(hit("snip"), &page("Full page text"));
        assert_eq!(enriched.content, "Full page text");
        assert_eq!(enriched.content_source, ContentSource::Page);
        assert_eq!(enriched.published_date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn enriched_falls_back_to_snippet() {
        let failed = ScrapedContent::failed("https://example.com/a", "boom");
        let enriched = EnrichedResult::from_parts(hit("the snippet"), &failed);
        assert_eq!(enriched.content, "the snippet");
        assert_eq!(enriched.content_source, ContentSource::Snippet);
    }

    #[test]
    fn enriched_falls_back_to_title_without_snippet() {
        let failed = ScrapedContent::failed("https://example.com/a", "boom");
        let enriched = EnrichedResult::from_parts(hit(""), &failed);
        assert_eq!(enriched.content, "Example");
    }

    #[test]
    fn summary_prefixes_snippet_once() {
        let enriched = EnrichedResult::from_parts(hit("Lead"), &page("Body text"));
        assert_eq!(enriched.summary(100), "Lead\nBody text");

        let repeated = EnrichedResult::from_parts(hit("Body"), &page("Body text"));
        assert_eq!(repeated.summary(100), "Body text");
    }

    #[test]
    fn summary_respects_limit() {
        let enriched = EnrichedResult::from_parts(hit(""), &page(&"word ".repeat(100)));
        assert!(enriched.summary(20).chars().count() <= 20);
    }
}
