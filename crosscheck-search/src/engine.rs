//! The adapter seam between the orchestrator and individual engines.

use crate::error::SearchError;
use crate::types::{SearchEngine, SearchResult};

/// A search engine backend.
///
/// Implementors fetch and parse one engine's results and return them
/// already filtered and ranked (see [`crate::engines::finalize_hits`]).
/// Errors are for the orchestrator to log and absorb; they never reach
/// the caller of [`crate::SearchOrchestrator`].
///
/// All implementations must be `Send + Sync`.
pub trait SearchEngineTrait: Send + Sync {
    /// Search for `query`, returning at most `limit` results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails after retries, the
    /// engine blocks the request, or a required resource is unavailable.
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Which engine this is.
    fn engine_type(&self) -> SearchEngine;
}
