//! Error types for the crosscheck pipeline.

use crosscheck_search::SearchError;

/// Top-level error type.
///
/// Scoring and validation never fail; only configuration and file I/O do.
#[derive(Debug, thiserror::Error)]
pub enum CrosscheckError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search-side construction error (invalid search config, HTTP client).
    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CrosscheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_convert() {
        let err: CrosscheckError = SearchError::Config("max_results must be greater than 0".into()).into();
        assert!(matches!(err, CrosscheckError::Search(_)));
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CrosscheckError = io.into();
        assert_eq!(err.to_string(), "I/O error: missing");
    }
}
