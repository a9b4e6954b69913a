//! Error types for the Bing adapter.

use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, BingError>;

/// Errors that can occur while talking to Bing or reading its pages.
#[derive(Error, Debug)]
pub enum BingError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Bing answered with a non-success status.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A `/ck/a` redirect link could not be turned back into its destination.
    #[error("Failed to decode redirect URL: {0}")]
    RedirectDecode(String),

    /// Invalid query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid adapter configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

/// A failure tied to a single result block of a page.
///
/// Sibling blocks on the same page are unaffected.
#[derive(Error, Debug)]
#[error("result #{position} ({title}): {source}")]
pub struct RecordError {
    /// Zero-based position of the block among the page's result blocks.
    pub position: usize,
    /// Title of the block, kept so the failure can be reported.
    pub title: String,
    /// What went wrong.
    #[source]
    pub source: BingError,
}
