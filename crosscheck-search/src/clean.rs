//! Text cleaning: boilerplate removal, character filtering, noise stripping.
//!
//! [`clean`] accepts either raw HTML or already-extracted text and produces
//! compact, readable text capped at a character limit. Applying it twice
//! with the same limit gives the same output as applying it once.

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Marker appended to truncated text. Counted against the limit.
pub const TRUNCATION_MARKER: &str = "...";

/// Elements removed together with everything inside them.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "iframe", "noscript", "meta", "link",
    "svg", "form", "button",
];

/// Elements that start a new line when flattened to text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "section", "article", "main", "blockquote", "pre", "dd", "dt", "figcaption",
];

/// Punctuation kept by the character filter.
const ALLOWED_PUNCTUATION: &str = ".,;:!?'\"()-%$/&@#+=*[]";

static MARKUP: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[a-zA-Z!/][^>]*>").ok());

static NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(we use|this (web)?site uses) cookies\b[^.!?\n]*[.!?]?",
        r"(?i)\baccept (all )?cookies\b",
        r"(?i)\bcookie (policy|settings|preferences|consent)\b",
        r"(?i)\b(subscribe|sign up) (to|for) (our|the) newsletter\b[^.!?\n]*[.!?]?",
        r"(?i)\bfollow us on \w+",
        r"(?i)\bshare (this|on) (article|page|post|story|facebook|twitter|x|linkedin|whatsapp|email)\b",
        r"(?i)\ball rights reserved\b\.?",
        r"(?i)\bclick here to (subscribe|share|print)\b",
    ]
    .iter()
    .filter_map(|pattern| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid noise pattern");
            None
        }
    })
    .collect()
});

/// Clean `raw` (HTML or plain text) and cap it at `max_chars` characters.
///
/// Markup is flattened to text after boilerplate elements are removed, then
/// characters outside the allow-list are dropped, whitespace is collapsed,
/// noise phrases are removed and the result is truncated with
/// [`TRUNCATION_MARKER`].
pub fn clean(raw: &str, max_chars: usize) -> String {
    let text = if MARKUP.as_ref().is_some_and(|re| re.is_match(raw)) {
        html_to_text(raw)
    } else {
        raw.to_owned()
    };

    let filtered = filter_chars(&text);
    let denoised = strip_noise(&filtered);
    truncate_chars(&denoised, max_chars)
}

/// Flatten an HTML document or fragment to text, minus boilerplate.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(&strip_boilerplate(html));
    match Selector::parse("body") {
        Ok(body) => match document.select(&body).next() {
            Some(el) => element_text(el),
            None => element_text(document.root_element()),
        },
        Err(_) => element_text(document.root_element()),
    }
}

/// Text of `root` with block-level elements separated by newlines.
pub fn element_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// Remove every [`BOILERPLATE_TAGS`] element and its content from raw HTML.
pub fn strip_boilerplate(html: &str) -> String {
    BOILERPLATE_TAGS
        .iter()
        .fold(html.to_owned(), |acc, tag| strip_tag(&acc, tag))
}

/// Remove all instances of one tag and its content.
///
/// Matching is ASCII case-insensitive. A tag without a closing counterpart
/// (`<meta ...>`, `<link ...>`) is removed up to the end of its opening tag.
fn strip_tag(html: &str, tag: &str) -> String {
    // ASCII lowering keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(offset) = lower[pos..].find(&open) {
        let start = pos + offset;
        let after = start + open.len();

        // `<nav` must not match `<navigation>`.
        let boundary = lower
            .as_bytes()
            .get(after)
            .is_none_or(|b| matches!(b, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t'));
        if !boundary {
            out.push_str(&html[pos..after]);
            pos = after;
            continue;
        }

        out.push_str(&html[pos..start]);
        pos = match lower[start..].find(&close) {
            Some(end) => start + end + close.len(),
            None => lower[start..]
                .find('>')
                .map_or(html.len(), |end| start + end + 1),
        };
    }

    out.push_str(&html[pos..]);
    out
}

fn is_allowed(ch: char) -> bool {
    ch.is_alphanumeric() || ch.is_whitespace() || ALLOWED_PUNCTUATION.contains(ch)
}

/// Drop characters outside the allow-list.
fn filter_chars(text: &str) -> String {
    text.chars().filter(|&ch| is_allowed(ch)).collect()
}

/// Trim lines, collapse whitespace runs, drop blank lines.
pub fn normalise_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove noise phrases until none remain.
///
/// Removal can bring two fragments together that form a new match, so the
/// pass repeats on the normalised text until it reaches a fixpoint. Every
/// match removes at least one letter, which bounds the loop.
fn strip_noise(text: &str) -> String {
    let mut current = normalise_whitespace(text);
    loop {
        let removed = NOISE
            .iter()
            .fold(current.clone(), |acc, re| re.replace_all(&acc, "").into_owned());
        let next = normalise_whitespace(&removed);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Cap `text` at `max_chars` characters including [`TRUNCATION_MARKER`].
///
/// Cuts at the last whitespace before the limit when there is one, so the
/// kept words are whole. Limits shorter than the marker simply take a
/// prefix, minus any trailing whitespace.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_len {
        let prefix: String = text.chars().take(max_chars).collect();
        return prefix.trim_end().to_owned();
    }

    let prefix: String = text.chars().take(max_chars - marker_len).collect();
    let cut = match prefix.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &prefix[..idx],
        _ => prefix.as_str(),
    };

    let mut out = cut.trim_end().to_owned();
    out.push_str(TRUNCATION_MARKER);
    out
}
