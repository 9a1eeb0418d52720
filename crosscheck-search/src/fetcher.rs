//! Page fetching: direct HTTP first, headless browser second.
//!
//! [`PageFetcher::fetch`] never fails. Whatever happens, it returns a
//! [`ScrapedContent`] whose `status` says whether text was extracted.

use reqwest::header::REFERER;
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::browser::BrowserSession;
use crate::clean::{clean, element_text, normalise_whitespace, strip_boilerplate};
use crate::config::SearchConfig;
use crate::dates::normalize_date;
use crate::error::SearchError;
use crate::http;
use crate::selectors::SelectorChain;
use crate::types::{FetchMethod, FetchStatus, ScrapedContent};

/// Referer sent with direct fetches; pages reached from a search engine
/// look less like bot traffic.
const REFERER_URL: &str = "https://www.google.com/";

/// A container must hold more than this many characters to be chosen over
/// the full body.
const MIN_CONTAINER_CHARS: usize = 100;

/// Semantic content containers, most specific first.
const CONTENT_CONTAINERS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".article-body",
    "#content",
    ".content",
    ".post",
    ".story-body",
];

static DATE_META: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(&[
        "meta[property='article:published_time']",
        "meta[name='article:published_time']",
        "meta[itemprop='datePublished']",
        "meta[property='og:published_time']",
        "meta[name='date']",
        "meta[name='pubdate']",
        "meta[name='publish-date']",
    ])
});

static TIME_ELEMENT: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["time[datetime]"]));

static TITLE: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["title", "h1"]));

static OG_TITLE: LazyLock<SelectorChain> =
    LazyLock::new(|| SelectorChain::new(&["meta[property='og:title']"]));

/// Fetches result pages and reduces them to cleaned text.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    browser: Arc<BrowserSession>,
    config: Arc<SearchConfig>,
}

impl PageFetcher {
    pub fn new(
        client: reqwest::Client,
        browser: Arc<BrowserSession>,
        config: Arc<SearchConfig>,
    ) -> Self {
        Self {
            client,
            browser,
            config,
        }
    }

    /// Fetch `url` and return at most `max_chars` characters of cleaned text.
    ///
    /// Sleeps a random politeness delay first, then tries a direct GET with
    /// browser-like headers. Any failure of that step (transport error,
    /// non-2xx status, no extractable text) falls back to the headless
    /// browser. If both fail the result has `status == Error`, the combined
    /// error text and empty content.
    pub async fn fetch(&self, url: &str, max_chars: usize) -> ScrapedContent {
        if !self.config.url_filter.accept(url) {
            return ScrapedContent::failed(url, "URL rejected by filter");
        }

        http::polite_delay(self.config.fetch_delay_ms).await;

        let direct_error = match self.fetch_direct(url, max_chars).await {
            Ok(page) => return page,
            Err(e) => e,
        };
        tracing::debug!(url, error = %direct_error, "direct fetch failed, trying browser");

        if !self.browser.is_available().await {
            return ScrapedContent::failed(url, format!("direct fetch: {direct_error}"));
        }

        match self.fetch_rendered(url, max_chars).await {
            Ok(page) => page,
            Err(browser_error) => {
                tracing::debug!(url, error = %browser_error, "browser fetch failed");
                ScrapedContent::failed(
                    url,
                    format!("direct fetch: {direct_error}; browser: {browser_error}"),
                )
            }
        }
    }

    async fn fetch_direct(&self, url: &str, max_chars: usize) -> Result<ScrapedContent, SearchError> {
        let request = self
            .client
            .get(url)
            .header(REFERER, REFERER_URL)
            .timeout(Duration::from_secs(self.config.page_timeout_seconds));
        let html = http::fetch_text(request, url).await?;
        extract_page(&html, url, max_chars, FetchMethod::Direct)
    }

    async fn fetch_rendered(
        &self,
        url: &str,
        max_chars: usize,
    ) -> Result<ScrapedContent, SearchError> {
        let settle = http::pick_delay(self.config.render_settle_ms);
        let html = self.browser.render(url, None, settle).await?;
        extract_page(&html, url, max_chars, FetchMethod::Browser)
    }
}

/// Reduce an HTML page to a [`ScrapedContent`].
///
/// The first semantic container holding more than [`MIN_CONTAINER_CHARS`]
/// characters wins; otherwise the whole body is used.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no text survives cleaning.
pub fn extract_page(
    html: &str,
    url: &str,
    max_chars: usize,
    via: FetchMethod,
) -> Result<ScrapedContent, SearchError> {
    let raw = Html::parse_document(html);
    let title = page_title(&raw);
    let published_date = published_date(&raw);
    drop(raw);

    let document = Html::parse_document(&strip_boilerplate(html));
    let text = main_text(&document);
    let content = clean(&text, max_chars);
    if content.is_empty() {
        return Err(SearchError::Parse(format!("no extractable text at {url}")));
    }

    Ok(ScrapedContent {
        url: url.to_owned(),
        title,
        content,
        status: FetchStatus::Ok,
        error_message: None,
        published_date,
        via,
    })
}

fn main_text(document: &Html) -> String {
    for pattern in CONTENT_CONTAINERS {
        let Ok(selector) = Selector::parse(pattern) else {
            continue;
        };
        if let Some(text) = document
            .select(&selector)
            .map(|el| normalise_whitespace(&element_text(el)))
            .find(|text| text.chars().count() > MIN_CONTAINER_CHARS)
        {
            return text;
        }
    }

    match Selector::parse("body") {
        Ok(body) => document
            .select(&body)
            .next()
            .map(element_text)
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

fn page_title(document: &Html) -> String {
    let root = document.root_element();
    TITLE
        .text_in(root)
        .or_else(|| OG_TITLE.attr_in(root, "content"))
        .unwrap_or_default()
}

fn published_date(document: &Html) -> Option<String> {
    let root = document.root_element();
    DATE_META
        .attr_in(root, "content")
        .or_else(|| TIME_ELEMENT.attr_in(root, "datetime"))
        .as_deref()
        .and_then(normalize_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<html>
<head>
  <title>EBITDA explained</title>
  <meta property="article:published_time" content="2024-02-10T08:00:00Z">
  <script>track()</script>
</head>
<body>
  <nav>Home | Markets | Contact</nav>
  <div class="sidebar">Short teaser.</div>
  <article>
    <h1>What is EBITDA?</h1>
    <p>EBITDA stands for earnings before interest, taxes, depreciation and amortization.
       Analysts use it to compare operating profitability across companies.</p>
  </article>
  <footer>All rights reserved.</footer>
</body>
</html>"#;

    #[test]
    fn extracts_article_text_title_and_date() {
        let page = extract_page(ARTICLE, "https://example.com/ebitda", 5000, FetchMethod::Direct)
            .expect("extract");
        assert_eq!(page.title, "EBITDA explained");
        assert_eq!(page.published_date.as_deref(), Some("2024-02-10"));
        assert!(page.content.starts_with("What is EBITDA?"));
        assert!(page.content.contains("operating profitability"));
        assert!(!page.content.contains("Markets"));
        assert!(!page.content.contains("teaser"));
        assert_eq!(page.status, FetchStatus::Ok);
        assert_eq!(page.via, FetchMethod::Direct);
    }

    #[test]
    fn short_containers_fall_back_to_body() {
        let html = r#"<html><body>
            <main>Tiny.</main>
            <div>Body paragraph one.</div>
            <div>Body paragraph two.</div>
        </body></html>"#;
        let page = extract_page(html, "https://example.com", 5000, FetchMethod::Browser)
            .expect("extract");
        assert!(page.content.contains("Tiny."));
        assert!(page.content.contains("Body paragraph two."));
        assert!(page.title.is_empty());
        assert!(page.published_date.is_none());
    }

    #[test]
    fn time_element_date_is_used() {
        let html = r#"<html><body><p>Some text here.</p>
            <time datetime="2023-11-05">Nov 5</time></body></html>"#;
        let page =
            extract_page(html, "https://example.com", 5000, FetchMethod::Direct).expect("extract");
        assert_eq!(page.published_date.as_deref(), Some("2023-11-05"));
    }

    #[test]
    fn empty_page_is_a_parse_error() {
        let html = "<html><body><script>only()</script><nav>menu</nav></body></html>";
        let err = extract_page(html, "https://example.com", 5000, FetchMethod::Direct).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn content_respects_limit() {
        let body = "<p>word</p>".repeat(2000);
        let html = format!("<html><body>{body}</body></html>");
        let page = extract_page(&html, "https://example.com", 300, FetchMethod::Direct)
            .expect("extract");
        assert!(page.content.chars().count() <= 300);
    }

    #[tokio::test]
    async fn filtered_urls_fail_without_network() {
        let config = Arc::new(SearchConfig::default());
        let fetcher = PageFetcher::new(
            reqwest::Client::new(),
            Arc::new(BrowserSession::disabled("test")),
            config,
        );
        let page = fetcher.fetch("https://www.youtube.com/watch?v=1", 100).await;
        assert_eq!(page.status, FetchStatus::Error);
        assert_eq!(page.via, FetchMethod::None);
        assert!(page.content.is_empty());
    }
}
