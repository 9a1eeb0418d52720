//! Relevance scoring for web search evidence.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use crosscheck_search::{EnrichedResult, SearchResult};
use serde::{Deserialize, Serialize};

use super::ScoreBreakdown;
use super::recency::recency_score_at;
use super::tfidf::cosine_similarity;

const W_TITLE: f64 = 0.6;
const W_SNIPPET: f64 = 0.4;

const W_CONTENT: f64 = 0.6;
const W_RECENCY: f64 = 0.3;
const W_POSITION: f64 = 0.1;

/// Character cap on the text quoted for one source in a digest.
pub const QUOTE_CHARS: usize = 300;

/// Fields of a web hit that feed the scorer.
pub trait WebEvidence {
    fn title(&self) -> &str;
    fn snippet(&self) -> &str;
    fn url(&self) -> &str;
    fn published_date(&self) -> Option<&str>;

    /// Text quoted for this hit in a digest.
    fn quote(&self) -> String {
        self.snippet().to_owned()
    }
}

impl WebEvidence for SearchResult {
    fn title(&self) -> &str {
        &self.title
    }

    fn snippet(&self) -> &str {
        &self.snippet
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn published_date(&self) -> Option<&str> {
        self.published_date.as_deref()
    }
}

impl WebEvidence for EnrichedResult {
    fn title(&self) -> &str {
        &self.title
    }

    /// The engine snippet, or the scraped content when the engine gave none.
    fn snippet(&self) -> &str {
        if self.snippet.trim().is_empty() {
            &self.content
        } else {
            &self.snippet
        }
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn published_date(&self) -> Option<&str> {
        self.published_date.as_deref()
    }

    /// The engine snippet, or a capped lead of the page when there is none.
    fn quote(&self) -> String {
        if self.snippet.trim().is_empty() {
            self.summary(QUOTE_CHARS)
        } else {
            self.snippet.clone()
        }
    }
}

/// Score of one web result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultScore {
    /// Zero-based position in the scored list.
    pub index: usize,
    pub url: String,
    pub title: String,
    pub content_relevance: f64,
    pub recency: f64,
    pub position: f64,
    pub score: f64,
}

/// Scores for a whole result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebScore {
    /// Score of the best result, 0.0 for an empty list.
    pub score: f64,
    pub details: Vec<ResultScore>,
    pub best: Option<ResultScore>,
}

impl WebScore {
    /// Flatten into a [`ScoreBreakdown`] carrying the best result's components.
    pub fn breakdown(&self) -> ScoreBreakdown {
        let mut components = BTreeMap::new();
        components.insert("result_count".to_owned(), self.details.len() as f64);
        if let Some(best) = &self.best {
            components.insert("best_index".to_owned(), best.index as f64);
            components.insert("content_relevance".to_owned(), best.content_relevance);
            components.insert("recency".to_owned(), best.recency);
            components.insert("position".to_owned(), best.position);
        }
        ScoreBreakdown::new(self.score, components)
    }
}

/// Rank-based prior: 0.9 for the first result, 0.1 less per step, floor 0.5.
pub fn position_score(index: usize) -> f64 {
    (0.9 - 0.1 * index as f64).max(0.5)
}

/// Score every result against `query` and pick the best one.
pub fn score_web_results<R: WebEvidence>(results: &[R], query: &str) -> WebScore {
    score_web_results_at(results, query, Local::now().date_naive())
}

/// [`score_web_results`] with an explicit "today" for recency.
///
/// The best result is the highest score; on ties the earliest result wins.
pub fn score_web_results_at<R: WebEvidence>(results: &[R], query: &str, today: NaiveDate) -> WebScore {
    if results.is_empty() {
        return WebScore::default();
    }

    let details: Vec<ResultScore> = results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            let content_relevance = W_TITLE * cosine_similarity(result.title(), query)
                + W_SNIPPET * cosine_similarity(result.snippet(), query);
            let recency = recency_score_at(result.published_date(), today);
            let position = position_score(index);
            ResultScore {
                index,
                url: result.url().to_owned(),
                title: result.title().to_owned(),
                content_relevance,
                recency,
                position,
                score: W_CONTENT * content_relevance + W_RECENCY * recency + W_POSITION * position,
            }
        })
        .collect();

    let best = details
        .iter()
        .fold(None::<&ResultScore>, |best, candidate| match best {
            Some(b) if b.score >= candidate.score => Some(b),
            _ => Some(candidate),
        })
        .cloned();

    tracing::debug!(
        count = details.len(),
        best_index = best.as_ref().map(|b| b.index),
        "scored web results"
    );

    WebScore {
        score: best.as_ref().map_or(0.0, |b| b.score),
        details,
        best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosscheck_search::{ContentSource, SearchEngine};

    const EPS: f64 = 1e-9;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or_default()
    }

    fn hit(title: &str, snippet: &str, date: Option<&str>) -> SearchResult {
        SearchResult {
            url: format!("https://example.com/{}", title.len()),
            title: title.into(),
            snippet: snippet.into(),
            rank: 1,
            domain: "example.com".into(),
            engine: SearchEngine::Bing,
            published_date: date.map(str::to_owned),
        }
    }

    #[test]
    fn empty_list_scores_zero_with_no_best() {
        let score = score_web_results::<SearchResult>(&[], "ebitda");
        assert_eq!(score.score, 0.0);
        assert!(score.details.is_empty());
        assert!(score.best.is_none());
        assert_eq!(score.breakdown().score, 0.0);
    }

    #[test]
    fn position_prior_floors_at_half() {
        let expected = [0.9, 0.8, 0.7, 0.6, 0.5, 0.5, 0.5];
        for (i, want) in expected.iter().enumerate() {
            assert!((position_score(i) - want).abs() < EPS, "index {i}");
        }
    }

    #[test]
    fn irrelevant_undated_result_scores_baseline() {
        let score = score_web_results_at(&[hit("Weather", "Sunny", None)], "ebitda", today());
        assert!((score.score - (0.3 * 0.5 + 0.1 * 0.9)).abs() < EPS);
    }

    #[test]
    fn matching_title_and_snippet_score_full_relevance() {
        let results = [hit("EBITDA", "EBITDA", Some("2024-06-30"))];
        let score = score_web_results_at(&results, "ebitda", today());
        let best = score.best.as_ref().expect("best");
        assert!((best.content_relevance - 1.0).abs() < EPS);
        assert!((score.score - (0.6 + 0.3 + 0.09)).abs() < EPS);
    }

    #[test]
    fn relevant_result_beats_earlier_irrelevant_one() {
        let results = [
            hit("Weather today", "Rain later", None),
            hit("EBITDA explained", "What EBITDA means", None),
        ];
        let score = score_web_results_at(&results, "ebitda", today());
        assert_eq!(score.best.as_ref().map(|b| b.index), Some(1));
        assert_eq!(score.details.len(), 2);
    }

    #[test]
    fn ties_go_to_the_earliest_result() {
        // Positions 4 and 5 share the 0.5 floor, so their scores are equal.
        let mut results: Vec<_> = (0..4).map(|_| hit("Unrelated", "", None)).collect();
        results.push(hit("EBITDA", "", None));
        results.push(hit("EBITDA", "", None));
        let score = score_web_results_at(&results, "ebitda", today());
        assert_eq!(score.details[4].score, score.details[5].score);
        assert_eq!(score.best.as_ref().map(|b| b.index), Some(4));
    }

    #[test]
    fn fresh_results_outscore_stale_ones() {
        let results = [
            hit("EBITDA", "", Some("2019-01-01")),
            hit("EBITDA", "", Some("2024-06-29")),
        ];
        let score = score_web_results_at(&results, "ebitda", today());
        assert_eq!(score.best.as_ref().map(|b| b.index), Some(1));
        assert_eq!(score.details[0].recency, 0.5);
        assert_eq!(score.details[1].recency, 1.0);
    }

    #[test]
    fn enriched_results_fall_back_to_content() {
        let enriched = EnrichedResult {
            url: "https://example.com/a".into(),
            title: "Finance glossary".into(),
            snippet: String::new(),
            rank: 1,
            domain: "example.com".into(),
            engine: SearchEngine::SearX,
            content: "EBITDA".into(),
            content_source: ContentSource::Page,
            published_date: None,
        };
        assert_eq!(WebEvidence::snippet(&enriched), "EBITDA");
        let score = score_web_results_at(&[enriched], "ebitda", today());
        let best = score.best.expect("best");
        assert!((best.content_relevance - 0.4).abs() < EPS);
    }

    #[test]
    fn breakdown_reports_best_components() {
        let results = [hit("Weather", "", None), hit("EBITDA", "", None)];
        let breakdown = score_web_results_at(&results, "ebitda", today()).breakdown();
        assert_eq!(breakdown.component("best_index"), Some(1.0));
        assert_eq!(breakdown.component("result_count"), Some(2.0));
        assert_eq!(breakdown.component("recency"), Some(0.5));
    }
}
