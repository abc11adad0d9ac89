//! Shared error type and result alias for vantage.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, VantageError>;

/// Error taxonomy for the gateway.
///
/// Absence (unknown user, empty history, missing video) is never an error;
/// those cases are empty collections or null fields. Errors here are real
/// failures: unreachable database, failed lookups, upstream refusals.
#[derive(Debug, Error)]
pub enum VantageError {
    /// MongoDB connectivity or query failure
    #[error("Database error: {0}")]
    Database(String),

    /// The upstream recommendation service could not be reached
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// The live change stream ended or errored; callers decide whether to resubscribe
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Persistent cache slot read/write failure
    #[error("Cache slot error: {0}")]
    CacheSlot(String),

    /// Invalid configuration at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<mongodb::error::Error> for VantageError {
    fn from(e: mongodb::error::Error) -> Self {
        VantageError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for VantageError {
    fn from(e: reqwest::Error) -> Self {
        VantageError::Upstream(e.to_string())
    }
}
