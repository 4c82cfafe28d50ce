//! Error types for the scrubber application.

/// Top-level error type for the scrubber application.
#[derive(Debug, thiserror::Error)]
pub enum ScrubberError {
    /// Search setup or configuration error from the core.
    #[error("search error: {0}")]
    Search(#[from] scrubber_search::SearchError),

    /// Application configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScrubberError>;
