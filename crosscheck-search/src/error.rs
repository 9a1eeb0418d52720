//! Error types for the crosscheck-search crate.
//!
//! Nothing below the orchestrator boundary surfaces these to callers of
//! [`crate::SearchOrchestrator`]; they exist so adapters and the fetcher can
//! classify failures (retry, skip, disable) before absorbing them.

/// Errors that can occur while querying engines or fetching pages.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Transport-level HTTP failure (connect, reset, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote answered with a non-success status code.
    #[error("HTTP status {status}: {context}")]
    Status {
        /// Response status code.
        status: u16,
        /// Which request produced it.
        context: String,
    },

    /// A request or wait exceeded its timeout.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Expected markup or JSON was absent or malformed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The headless browser could not be started or driven.
    #[error("browser error: {0}")]
    Browser(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts, transport failures, `429` and `5xx` are transient; everything
    /// else is permanent for the current call.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Parse(_) | Self::Browser(_) | Self::Config(_) => false,
        }
    }

    /// Convert a [`reqwest::Error`] into the matching variant.
    pub fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                context: context.to_owned(),
            }
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for crosscheck-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_status() {
        let err = SearchError::Status {
            status: 503,
            context: "Bing".into(),
        };
        assert_eq!(err.to_string(), "HTTP status 503: Bing");
    }

    #[test]
    fn display_browser() {
        let err = SearchError::Browser("chrome not found".into());
        assert_eq!(err.to_string(), "browser error: chrome not found");
    }

    #[test]
    fn transient_classification() {
        assert!(SearchError::Timeout("x".into()).is_transient());
        assert!(SearchError::Http("reset".into()).is_transient());
        assert!(SearchError::Status {
            status: 429,
            context: String::new()
        }
        .is_transient());
        assert!(SearchError::Status {
            status: 502,
            context: String::new()
        }
        .is_transient());
        assert!(!SearchError::Status {
            status: 404,
            context: String::new()
        }
        .is_transient());
        assert!(!SearchError::Parse("x".into()).is_transient());
        assert!(!SearchError::Browser("x".into()).is_transient());
        assert!(!SearchError::Config("x".into()).is_transient());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
