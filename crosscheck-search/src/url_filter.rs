//! URL acceptance rules for results we surface or scrape.
//!
//! A citation engine should not recommend search engines, video platforms
//! or social networks back to the user, and cannot extract text from
//! binaries or media, so those are rejected up front.

use serde::{Deserialize, Serialize};
use url::Url;

/// Hosts that are never surfaced (matched as the domain or any subdomain).
pub const DEFAULT_DENIED_DOMAINS: &[&str] = &[
    "google.com",
    "bing.com",
    "duckduckgo.com",
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "dailymotion.com",
    "tiktok.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "pinterest.com",
];

/// Path extensions of documents, archives, executables and media.
pub const DEFAULT_DENIED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "zip", "rar", "7z", "tar",
    "gz", "bz2", "exe", "msi", "dmg", "apk", "iso", "bin", "mp3", "mp4", "avi", "mov",
    "mkv", "wav", "flac", "jpg", "jpeg", "png", "gif", "webp", "svg", "ico",
];

/// Configurable deny lists plus the fixed scheme/host rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlFilter {
    /// Registrable domains to reject, lowercase, without `www.`.
    pub denied_domains: Vec<String>,
    /// File extensions to reject, lowercase, without the dot.
    pub denied_extensions: Vec<String>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self {
            denied_domains: DEFAULT_DENIED_DOMAINS
                .iter()
                .map(|d| (*d).to_owned())
                .collect(),
            denied_extensions: DEFAULT_DENIED_EXTENSIONS
                .iter()
                .map(|e| (*e).to_owned())
                .collect(),
        }
    }
}

impl UrlFilter {
    /// A filter with empty deny lists; only the scheme/host rules apply.
    pub fn permissive() -> Self {
        Self {
            denied_domains: Vec::new(),
            denied_extensions: Vec::new(),
        }
    }

    /// Whether `raw` may be surfaced or scraped.
    ///
    /// Rejects empty strings, fragments, non-HTTP(S) schemes (including
    /// `javascript:` and `mailto:`), URLs without a host, denied hosts and
    /// denied path extensions. Any parse failure is a rejection.
    pub fn accept(&self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            return false;
        }

        let Ok(parsed) = Url::parse(raw) else {
            return false;
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }

        let Some(host) = parsed.host_str() else {
            return false;
        };
        if host.is_empty() || self.is_denied_host(host) {
            return false;
        }

        !self.has_denied_extension(parsed.path())
    }

    fn is_denied_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        self.denied_domains.iter().any(|denied| {
            let denied = denied.to_lowercase();
            host == denied
                || host
                    .strip_suffix(denied.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    fn has_denied_extension(&self, path: &str) -> bool {
        let last = path.rsplit('/').next().unwrap_or_default();
        let Some((_, ext)) = last.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_lowercase();
        self.denied_extensions
            .iter()
            .any(|denied| denied.eq_ignore_ascii_case(&ext))
    }
}

/// Host of `raw` without a leading `www.`, or an empty string.
pub fn domain_of(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .map(|h| h.strip_prefix("www.").map(str::to_owned).unwrap_or(h))
        .unwrap_or_default()
}
