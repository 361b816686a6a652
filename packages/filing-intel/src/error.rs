//! Typed errors for the filing analysis library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Model-call failures
//! are absent from the pipeline's public surface: they are
//! turned into failed records at the call site (see
//! [`ModelReply`](crate::traits::gateway::ModelReply)).

use thiserror::Error;

/// Errors that can occur in the filing analysis library.
#[derive(Debug, Error)]
pub enum FilingError {
    /// Caller supplied metadata that breaks the input contract
    #[error("invalid filing metadata: {field} {reason}")]
    InvalidMetadata {
        field: &'static str,
        reason: &'static str,
    },

    /// Model gateway transport failed
    #[error("model gateway error: {0}")]
    Gateway(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Issuer info lookup failed
    #[error("issuer lookup error: {0}")]
    IssuerLookup(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Result storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A configured label could not be compiled into a matcher
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilingError {
    /// Wrap any transport error as a gateway error.
    pub fn gateway(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Gateway(Box::new(err))
    }
}

/// Result type alias for filing operations.
pub type Result<T> = std::result::Result<T, FilingError>;
