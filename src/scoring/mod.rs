//! Relevance scoring for generated answers and web evidence.
//!
//! Everything here is pure and synchronous: no I/O, no failure modes. The
//! only clock read is "today" for recency, and every entry point has an
//! `_at` twin taking the date explicitly.

pub mod answer;
pub mod recency;
pub mod stopwords;
pub mod tfidf;
pub mod web;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use answer::{score_generated_answer, score_generated_answer_with};
pub use recency::{recency_score, recency_score_at};
pub use tfidf::cosine_similarity;
pub use web::{ResultScore, WebEvidence, WebScore, score_web_results, score_web_results_at};

/// A final score in `[0, 1]` plus the named inputs that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub components: BTreeMap<String, f64>,
}

impl ScoreBreakdown {
    /// Build a breakdown, clamping `score` into `[0, 1]`. NaN becomes 0.
    pub fn new(score: f64, components: BTreeMap<String, f64>) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self { score, components }
    }

    /// Look up one component by name.
    pub fn component(&self, name: &str) -> Option<f64> {
        self.components.get(name).copied()
    }
}
