//! URL canonicalisation for duplicate detection.
//!
//! Two links to the same page often differ only in tracking parameters,
//! parameter order, a fragment, host case, a default port or a trailing
//! slash. [`normalize_url`] maps such variants to one string.

use url::Url;

/// Query parameters that identify a campaign or click, not a page.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "utm_id",
    "fbclid",
    "gclid",
    "msclkid",
    "dclid",
    "mc_cid",
    "mc_eid",
    "ref",
    "ref_src",
    "si",
    "feature",
];

fn is_tracking(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&key.as_str())
}

/// Canonical form of `raw` for equality checks.
///
/// Drops the fragment, default ports and tracking parameters, sorts the
/// remaining parameters, and trims a trailing slash from non-root paths.
/// Scheme and host are lowercased by the parser. Unparseable input is
/// returned unchanged.
///
/// ```
/// use crosscheck_search::orchestrator::url_normalize::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://Example.COM/a/?utm_source=x&b=2&a=1#top"),
///     normalize_url("https://example.com/a?a=1&b=2"),
/// );
/// ```
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_owned();
    };

    parsed.set_fragment(None);

    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !is_tracking(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(&params);
    }

    let path = parsed.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_scheme_and_host_only() {
        assert_eq!(
            normalize_url("HTTPS://Example.COM/Path"),
            "https://example.com/Path"
        );
    }

    #[test]
    fn trailing_slash_rules() {
        assert_eq!(normalize_url("https://example.com/path/"), "https://example.com/path");
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn default_ports_removed_custom_kept() {
        assert_eq!(normalize_url("http://example.com:80/p"), "http://example.com/p");
        assert_eq!(normalize_url("https://example.com:443/p"), "https://example.com/p");
        assert_eq!(
            normalize_url("https://example.com:8080/p"),
            "https://example.com:8080/p"
        );
    }

    #[test]
    fn params_sorted_and_tracking_stripped() {
        assert_eq!(
            normalize_url("https://example.com/s?z=1&UTM_Source=x&a=2&msclkid=9"),
            "https://example.com/s?a=2&z=1"
        );
        assert_eq!(
            normalize_url("https://example.com/page?utm_source=a&fbclid=f&ref=h"),
            "https://example.com/page"
        );
    }

    #[test]
    fn fragment_removed() {
        assert_eq!(normalize_url("https://example.com/page#s"), "https://example.com/page");
    }

    #[test]
    fn unparseable_input_unchanged() {
        assert_eq!(normalize_url("not a url at all"), "not a url at all");
        assert_eq!(normalize_url(""), "");
    }
}
