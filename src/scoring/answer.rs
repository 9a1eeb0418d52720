//! Confidence score for a generated (retrieval-augmented) answer.

use std::collections::BTreeMap;

use super::ScoreBreakdown;
use super::tfidf::cosine_similarity;
use crate::config::ScoringConfig;

/// Phrases that signal a hedged answer. Each one present costs 0.1.
pub const HEDGING_PHRASES: &[&str] = &[
    "i don't know",
    "not sure",
    "unclear",
    "might be",
    "possibly",
    "perhaps",
    "i think",
    "seems like",
];

const PENALTY_PER_PHRASE: f64 = 0.1;
const MAX_PENALTY: f64 = 0.5;

const W_BASE: f64 = 0.4;
const W_RELEVANCE: f64 = 0.3;
const W_COMPLETENESS: f64 = 0.2;
const W_CERTAINTY: f64 = 0.1;

/// Score `answer` against `query` with the default scoring settings.
pub fn score_generated_answer(answer: &str, query: &str, prior: Option<f64>) -> ScoreBreakdown {
    score_generated_answer_with(answer, query, prior, &ScoringConfig::default())
}

/// Score `answer` against `query`.
///
/// The final score blends the caller's prior confidence (or the configured
/// default), TF-IDF relevance to the query, length-based completeness and a
/// penalty for hedging phrases. It is clamped to `[0, 1]`.
pub fn score_generated_answer_with(
    answer: &str,
    query: &str,
    prior: Option<f64>,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let base = prior.unwrap_or(config.default_confidence);
    let relevance = cosine_similarity(answer, query);
    let completeness = completeness(answer, config.completeness_chars);
    let penalty = hedging_penalty(answer);

    let score = W_BASE * base
        + W_RELEVANCE * relevance
        + W_COMPLETENESS * completeness
        + W_CERTAINTY * (1.0 - penalty.min(MAX_PENALTY));

    let components = BTreeMap::from([
        ("base_confidence".to_owned(), base),
        ("relevance".to_owned(), relevance),
        ("completeness".to_owned(), completeness),
        ("uncertainty_penalty".to_owned(), penalty),
    ]);
    ScoreBreakdown::new(score, components)
}

fn completeness(answer: &str, target_chars: usize) -> f64 {
    if target_chars == 0 {
        return 1.0;
    }
    (answer.chars().count() as f64 / target_chars as f64).min(1.0)
}

/// 0.1 for every distinct hedging phrase found, case-insensitively.
pub fn hedging_penalty(answer: &str) -> f64 {
    let lowered = answer.to_lowercase();
    let hits = HEDGING_PHRASES
        .iter()
        .filter(|phrase| lowered.contains(*phrase))
        .count();
    hits as f64 * PENALTY_PER_PHRASE
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn empty_answer_keeps_prior_and_certainty() {
        let score = score_generated_answer("", "what is ebitda", None);
        assert!((score.score - (0.4 * 0.6 + 0.1)).abs() < EPS);
        assert_eq!(score.component("relevance"), Some(0.0));
        assert_eq!(score.component("completeness"), Some(0.0));
        assert_eq!(score.component("base_confidence"), Some(0.6));
    }

    #[test]
    fn prior_overrides_default() {
        let low = score_generated_answer("EBITDA", "ebitda", Some(0.1));
        let high = score_generated_answer("EBITDA", "ebitda", Some(0.9));
        assert!((high.score - low.score - 0.4 * 0.8).abs() < EPS);
    }

    #[test]
    fn long_relevant_answer_scores_high() {
        let answer = "EBITDA stands for earnings before interest, taxes, depreciation and \
                      amortization. "
            .repeat(8);
        let score = score_generated_answer(&answer, "What is EBITDA?", Some(0.9));
        assert_eq!(score.component("completeness"), Some(1.0));
        assert!(score.score > 0.7);
    }

    #[test]
    fn hedging_costs_a_tenth_per_phrase() {
        assert_eq!(hedging_penalty("EBITDA is a profit measure."), 0.0);
        assert!((hedging_penalty("I think it is possibly EBITDA") - 0.2).abs() < EPS);
        assert!((hedging_penalty("Perhaps. Perhaps. PERHAPS.") - 0.1).abs() < EPS);
    }

    #[test]
    fn penalty_is_capped_in_the_score() {
        let hedged = "I don't know, not sure, unclear, might be, possibly, perhaps, i think";
        let score = score_generated_answer(hedged, "ebitda", Some(0.5));
        assert!((score.component("uncertainty_penalty").unwrap_or_default() - 0.7).abs() < EPS);
        let completeness = hedged.chars().count() as f64 / 500.0;
        let expected = 0.4 * 0.5 + 0.2 * completeness + 0.1 * 0.5;
        assert!((score.score - expected).abs() < EPS);
    }

    #[test]
    fn score_is_clamped() {
        let score = score_generated_answer("ebitda", "ebitda", Some(5.0));
        assert_eq!(score.score, 1.0);
        let score = score_generated_answer("", "ebitda", Some(-5.0));
        assert_eq!(score.score, 0.0);
    }

    #[test]
    fn completeness_counts_characters() {
        let config = ScoringConfig {
            completeness_chars: 10,
            ..ScoringConfig::default()
        };
        let score = score_generated_answer_with("ééééé", "x", None, &config);
        assert_eq!(score.component("completeness"), Some(0.5));
    }
}
