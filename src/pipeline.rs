//! End-to-end crosscheck: search the web, enrich, score, pick a source.

use std::time::Duration;

use tokio::time::Instant;

use crosscheck_search::{EnrichedResult, SearchOrchestrator};

use crate::config::CrosscheckConfig;
use crate::error::Result;
use crate::validator::{ValidationReport, validate_detailed};

/// Owns one search orchestrator and the scoring settings.
#[derive(Debug)]
pub struct Crosscheck {
    config: CrosscheckConfig,
    orchestrator: SearchOrchestrator,
}

impl Crosscheck {
    /// Validate `config` and build the search side.
    ///
    /// # Errors
    ///
    /// Returns an error if either config section is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: CrosscheckConfig) -> Result<Self> {
        config.scoring.validate()?;
        let orchestrator = SearchOrchestrator::new(config.search.clone())?;
        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// Use an orchestrator built elsewhere; its search settings replace
    /// `config.search`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scoring section is invalid.
    pub fn with_orchestrator(mut config: CrosscheckConfig, orchestrator: SearchOrchestrator) -> Result<Self> {
        config.scoring.validate()?;
        config.search = orchestrator.config().clone();
        Ok(Self {
            config,
            orchestrator,
        })
    }

    pub fn config(&self) -> &CrosscheckConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    /// Search and enrich within the request deadline.
    ///
    /// The search itself must finish before the deadline, or there is no web
    /// evidence at all. Enrichment gets whatever time is left; results whose
    /// pages were not reached keep their snippets.
    pub async fn gather(&self, query: &str) -> Vec<EnrichedResult> {
        let budget = Duration::from_secs(self.config.scoring.request_deadline_secs);
        let deadline = Instant::now() + budget;
        let num_results = self.config.scoring.num_results;

        let search = self.orchestrator.multi_engine_search(query, num_results);
        let results = match tokio::time::timeout_at(deadline, search).await {
            Ok(results) => results,
            Err(_) => {
                tracing::warn!(deadline_secs = budget.as_secs(), "web search timed out");
                return Vec::new();
            }
        };
        if results.is_empty() {
            return Vec::new();
        }
        self.orchestrator.enrich_until(results, deadline).await
    }

    /// Cross-check `generated_answer` for `query` against fresh web evidence.
    pub async fn answer(
        &self,
        query: &str,
        generated_answer: &str,
        prior: Option<f64>,
    ) -> ValidationReport {
        tracing::trace!(query, "crosscheck");
        let evidence = self.gather(query).await;
        let report = validate_detailed(generated_answer, &evidence, query, prior, &self.config.scoring);
        tracing::info!(
            best_source = %report.outcome.best_source,
            rag_score = report.outcome.rag_score,
            web_score = report.outcome.web_score,
            evidence = evidence.len(),
            "crosscheck complete"
        );
        report
    }

    /// Release the headless browser if one was launched.
    pub async fn shutdown(&self) {
        self.orchestrator.shutdown().await;
    }
}
