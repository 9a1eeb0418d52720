//! Data-driven CSS selector strategies for scraping result pages.
//!
//! Engines change their markup often, so every adapter describes its page
//! as ordered lists of alternatives rather than one fixed selector: the
//! first container selector that matches anything wins, and within each
//! container the first title/link/snippet variant that yields a value is
//! used.

use scraper::{ElementRef, Html, Selector};

use crate::engines::RawHit;

/// Ordered alternatives for one piece of a result page.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    /// Compile `patterns` in order. Invalid patterns are logged and skipped.
    pub fn new(patterns: &[&str]) -> Self {
        let selectors = patterns
            .iter()
            .filter_map(|pattern| match Selector::parse(pattern) {
                Ok(sel) => Some(sel),
                Err(e) => {
                    tracing::warn!(pattern, error = ?e, "skipping invalid selector");
                    None
                }
            })
            .collect();
        Self { selectors }
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Matches of the first selector that matches anything in `doc`.
    pub fn containers<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        self.selectors
            .iter()
            .map(|sel| doc.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    /// First element under `scope` matched by any selector, in chain order.
    pub fn first_in<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|sel| scope.select(sel).next())
    }

    /// First non-empty, whitespace-collapsed text under `scope`.
    pub fn text_in(&self, scope: ElementRef<'_>) -> Option<String> {
        self.selectors.iter().find_map(|sel| {
            scope
                .select(sel)
                .map(collapsed_text)
                .find(|text| !text.is_empty())
        })
    }

    /// First non-empty `attr` value under `scope`. The scope element itself
    /// is checked last, which covers containers that are the link.
    pub fn attr_in(&self, scope: ElementRef<'_>, attr: &str) -> Option<String> {
        self.selectors
            .iter()
            .find_map(|sel| {
                scope
                    .select(sel)
                    .filter_map(|el| el.value().attr(attr))
                    .map(str::trim)
                    .find(|v| !v.is_empty())
                    .map(str::to_owned)
            })
            .or_else(|| {
                scope
                    .value()
                    .attr(attr)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_owned)
            })
    }
}

/// Text of `el` with whitespace runs collapsed to single spaces.
pub fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One way of reading a results page.
#[derive(Debug, Clone)]
pub struct ResultLayout {
    /// Label used in logs.
    pub name: &'static str,
    /// One element per organic result.
    pub containers: SelectorChain,
    /// Title text, relative to the container.
    pub title: SelectorChain,
    /// Element carrying the result link in `href`.
    pub link: SelectorChain,
    /// Snippet text. Missing snippets are fine.
    pub snippet: SelectorChain,
}

impl ResultLayout {
    pub fn new(
        name: &'static str,
        containers: &[&str],
        title: &[&str],
        link: &[&str],
        snippet: &[&str],
    ) -> Self {
        Self {
            name,
            containers: SelectorChain::new(containers),
            title: SelectorChain::new(title),
            link: SelectorChain::new(link),
            snippet: SelectorChain::new(snippet),
        }
    }

    /// Read raw hits from `doc`. `resolve` turns an `href` into the target
    /// URL (unwrapping engine redirects); `None` drops the item.
    pub fn extract<F>(&self, doc: &Html, resolve: F) -> Vec<RawHit>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.containers
            .containers(doc)
            .into_iter()
            .filter_map(|item| {
                let title = self.title.text_in(item)?;
                let href = self.link.attr_in(item, "href")?;
                let url = resolve(&href)?;
                let snippet = self.snippet.text_in(item).unwrap_or_default();
                Some(RawHit {
                    title,
                    url,
                    snippet,
                    published_date: None,
                })
            })
            .collect()
    }
}

/// Try `layouts` in order; the first that yields any hit wins.
pub fn extract_first<F>(layouts: &[ResultLayout], doc: &Html, resolve: F) -> Vec<RawHit>
where
    F: Fn(&str) -> Option<String>,
{
    for layout in layouts {
        let hits = layout.extract(doc, &resolve);
        if !hits.is_empty() {
            tracing::debug!(layout = layout.name, count = hits.len(), "layout matched");
            return hits;
        }
        tracing::debug!(layout = layout.name, "layout found nothing");
    }
    Vec::new()
}
