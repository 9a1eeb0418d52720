//! Sequential engine fallback.
//!
//! Engines are asked one at a time in priority order. The first one to
//! return a non-empty list ends the chain; its list is the answer, with no
//! merging across engines. Errors and empty lists both mean "try the next
//! engine", and an engine whose circuit is open counts as empty.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use super::url_normalize::normalize_url;
use crate::circuit_breaker::CircuitBreaker;
use crate::engine::SearchEngineTrait;
use crate::types::SearchResult;

/// Ask `engines` in order and return the first non-empty answer, re-ranked.
///
/// Never fails: when every engine errors, is skipped or finds nothing the
/// result is an empty `Vec`.
pub async fn first_non_empty<E: SearchEngineTrait>(
    engines: &[E],
    breaker: &Mutex<CircuitBreaker>,
    query: &str,
    limit: usize,
) -> Vec<SearchResult> {
    if limit == 0 {
        return Vec::new();
    }

    for engine in engines {
        let kind = engine.engine_type();
        let allowed = breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .allows(kind);
        if !allowed {
            tracing::debug!(engine = kind.name(), "circuit open, skipping engine");
            continue;
        }

        match engine.search(query, limit).await {
            Ok(results) if !results.is_empty() => {
                breaker
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record_success(kind);
                tracing::debug!(engine = kind.name(), count = results.len(), "engine answered");
                return rerank(results, limit);
            }
            Ok(_) => {
                tracing::debug!(engine = kind.name(), "engine returned no results, falling back");
            }
            Err(e) => {
                breaker
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record_failure(kind);
                tracing::warn!(engine = kind.name(), error = %e, "engine failed, falling back");
            }
        }
    }

    tracing::debug!("no engine produced results");
    Vec::new()
}

/// Drop duplicate URLs (keeping the first), cap at `limit`, and renumber
/// ranks 1, 2, 3, ….
pub fn rerank(results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(normalize_url(&r.url)))
        .take(limit)
        .enumerate()
        .map(|(i, mut r)| {
            r.rank = i + 1;
            r
        })
        .collect()
}
