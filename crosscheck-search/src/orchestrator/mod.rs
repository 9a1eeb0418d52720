//! Search orchestrator: sequential engine fallback, dedup, re-rank, enrich.
//!
//! Engines are queried one at a time in configured priority order. The
//! first non-empty answer is deduplicated by normalised URL, re-ranked and
//! truncated, then optionally enriched with scraped page content.

pub mod fallback;
pub mod search;
pub mod url_normalize;

pub use search::SearchOrchestrator;
