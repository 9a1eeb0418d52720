//! Pick between a generated answer and web evidence.
//!
//! The web side wins only when its best result scores strictly higher than
//! the generated answer; ties keep the answer. When the web wins, the
//! selected answer is a short digest of the top results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::scoring::{
    ScoreBreakdown, WebEvidence, WebScore, score_generated_answer_with, score_web_results,
};

/// Digest text when there is nothing to quote.
pub const NO_WEB_RESULTS: &str = "No web results available.";

/// Scores above this count as high confidence in the recommendation.
const HIGH_CONFIDENCE: f64 = 0.8;
/// Score gap under which both sources are treated as equally reliable.
const EQUAL_MARGIN: f64 = 0.1;

/// Which source supplied the selected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BestSource {
    Rag,
    Web,
}

impl fmt::Display for BestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rag => "rag",
            Self::Web => "web",
        })
    }
}

/// Outcome of comparing the two sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub best_source: BestSource,
    pub rag_score: f64,
    pub web_score: f64,
    pub selected_answer: String,
}

/// Conditions that shape the recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFlags {
    pub no_web_results: bool,
    pub low_rag_confidence: bool,
    pub low_web_relevance: bool,
}

impl ValidationFlags {
    /// Flags for the given scores. A score below `threshold` is low.
    pub fn derive(rag_score: f64, web_score: f64, web_count: usize, threshold: f64) -> Self {
        Self {
            no_web_results: web_count == 0,
            low_rag_confidence: rag_score < threshold,
            low_web_relevance: web_score < threshold,
        }
    }
}

/// Everything behind a [`ValidationOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub outcome: ValidationOutcome,
    pub rag: ScoreBreakdown,
    pub web: WebScore,
    pub flags: ValidationFlags,
    pub recommendation: String,
}

/// Compare `answer` with `web_results` for `query` using default settings.
pub fn validate<R: WebEvidence>(
    answer: &str,
    web_results: &[R],
    query: &str,
    prior: Option<f64>,
) -> ValidationOutcome {
    validate_detailed(answer, web_results, query, prior, &ScoringConfig::default()).outcome
}

/// Compare the two sources and explain the decision.
pub fn validate_detailed<R: WebEvidence>(
    answer: &str,
    web_results: &[R],
    query: &str,
    prior: Option<f64>,
    config: &ScoringConfig,
) -> ValidationReport {
    let rag = score_generated_answer_with(answer, query, prior, config);
    let web = score_web_results(web_results, query);
    let (rag_score, web_score) = (rag.score, web.score);

    let (best_source, selected_answer) = if web_score > rag_score {
        (
            BestSource::Web,
            summarize_web_results(web_results, config.digest_sources),
        )
    } else {
        (BestSource::Rag, answer.to_owned())
    };

    let flags = ValidationFlags::derive(
        rag_score,
        web_score,
        web_results.len(),
        config.low_confidence_threshold,
    );
    let recommendation = recommend(rag_score, web_score, &flags).to_owned();

    tracing::debug!(%best_source, rag_score, web_score, %recommendation, "validated answer");

    ValidationReport {
        outcome: ValidationOutcome {
            best_source,
            rag_score,
            web_score,
            selected_answer,
        },
        rag,
        web,
        flags,
        recommendation,
    }
}

/// Quote the first `top_n` results as numbered sources.
pub fn summarize_web_results<R: WebEvidence>(results: &[R], top_n: usize) -> String {
    if results.is_empty() {
        return NO_WEB_RESULTS.to_owned();
    }
    results
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Source {}: {}\n{}\n[{}]\n",
                i + 1,
                r.title(),
                r.quote(),
                r.url()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable advice, checked in a fixed order.
pub fn recommend(rag_score: f64, web_score: f64, flags: &ValidationFlags) -> &'static str {
    if flags.no_web_results {
        "Using RAG response as no web results available"
    } else if flags.low_rag_confidence && flags.low_web_relevance {
        "Both sources have low confidence - consider rephrasing query"
    } else if rag_score > HIGH_CONFIDENCE {
        "High confidence in RAG response"
    } else if web_score > HIGH_CONFIDENCE {
        "High confidence in web results"
    } else if (rag_score - web_score).abs() < EQUAL_MARGIN {
        "Sources are equally reliable - consider combining both"
    } else if rag_score > web_score {
        "Preferred source: RAG"
    } else {
        "Preferred source: Web"
    }
}
