//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The event payload could not be normalized. Consumers log and drop
    /// these; the stream task must keep running.
    #[error("Malformed state update: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

impl From<rust_decimal::Error> for FeedError {
    fn from(e: rust_decimal::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
