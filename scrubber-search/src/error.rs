//! Error types for the scrubber-search crate.
//!
//! Malformed HTML, unusable hrefs and failed fetches are never errors here:
//! they shrink the result set instead. These variants cover the few things
//! that are genuinely the caller's problem.

/// Errors that can occur while setting up or running a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The HTTP client backing the default fetcher could not be built.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The fetch context thread or its runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Convenience type alias for scrubber-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_results must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_results must be > 0");
    }

    #[test]
    fn display_runtime() {
        let err = SearchError::Runtime("thread spawn failed".into());
        assert_eq!(err.to_string(), "runtime error: thread spawn failed");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
