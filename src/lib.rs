//! Crosscheck: validate a generated answer against fresh web evidence.
//!
//! A question is answered twice: once by the caller's generator (usually a
//! retrieval-augmented model) and once by live web search. Both are scored
//! and the stronger source is selected:
//! query → search engines → page enrichment → scoring → validation
//!
//! # Architecture
//!
//! - **Search**: `crosscheck-search` scrapes public engines in fallback
//!   order and enriches each hit with cleaned page text
//! - **Scoring**: TF-IDF relevance, recency and rank priors for web hits;
//!   prior confidence, relevance, completeness and hedging for the answer
//! - **Validation**: the web wins only on a strictly higher score, and then
//!   a digest of the top sources becomes the selected answer
//! - **Pipeline**: [`Crosscheck`] ties the steps together under a deadline

pub mod config;
pub mod error;
pub mod pipeline;
pub mod scoring;
pub mod validator;

pub use config::{CrosscheckConfig, ScoringConfig};
pub use error::{CrosscheckError, Result};
pub use pipeline::Crosscheck;
pub use scoring::ScoreBreakdown;
pub use validator::{
    BestSource, ValidationFlags, ValidationOutcome, ValidationReport, validate, validate_detailed,
};

pub use crosscheck_search;
