//! Error types for the feed pipeline.

use thiserror::Error;

/// Errors that can abort a feed update run.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Calendar parse error: {0}")]
    Parse(String),

    #[error("Unknown timezone '{0}'")]
    Timezone(String),

    #[error("Publish step '{step}' failed: {source}")]
    Publish {
        step: &'static str,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
