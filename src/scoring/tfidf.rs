//! Two-document TF-IDF cosine similarity.
//!
//! Each call fits a fresh vocabulary on just the two texts being compared:
//! lowercase, tokens of two or more word characters, English stop words
//! removed, smoothed idf `ln((1 + n) / (1 + df)) + 1` with `n = 2`, and each
//! row L2-normalised before the dot product.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::stopwords::is_stop_word;

static TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").ok());

fn term_counts(text: &str) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    let Some(token) = TOKEN.as_ref() else {
        return counts;
    };
    let lowered = text.to_lowercase();
    for m in token.find_iter(&lowered) {
        let term = m.as_str();
        if !is_stop_word(term) {
            *counts.entry(term.to_owned()).or_insert(0.0) += 1.0;
        }
    }
    counts
}

fn weighted(counts: &BTreeMap<String, f64>, other: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    const DOCS: f64 = 2.0;
    let mut row: BTreeMap<String, f64> = counts
        .iter()
        .map(|(term, tf)| {
            let df = if other.contains_key(term) { 2.0 } else { 1.0 };
            let idf = ((1.0 + DOCS) / (1.0 + df)).ln() + 1.0;
            (term.clone(), tf * idf)
        })
        .collect();
    let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.values_mut().for_each(|w| *w /= norm);
    }
    row
}

/// Cosine similarity of `a` and `b` in `[0, 1]`.
///
/// Returns 0.0 when either text is empty or when neither has a token left
/// after stop-word removal.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (ca, cb) = (term_counts(a), term_counts(b));
    if ca.is_empty() || cb.is_empty() {
        return 0.0;
    }
    let (wa, wb) = (weighted(&ca, &cb), weighted(&cb, &ca));
    let dot: f64 = wa
        .iter()
        .filter_map(|(term, w)| wb.get(term).map(|v| w * v))
        .sum();
    if dot.is_finite() { dot.clamp(0.0, 1.0) } else { 0.0 }
}
