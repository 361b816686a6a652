//! Error types for the OpenRouter client.

use thiserror::Error;

/// Result type for OpenRouter client operations.
pub type Result<T> = std::result::Result<T, OpenRouterError>;

/// OpenRouter client errors.
#[derive(Debug, Error)]
pub enum OpenRouterError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, empty choices)
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The API answered but carried no usable completion
    #[error("Empty completion from model {model}")]
    EmptyCompletion { model: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenRouterError {
    /// Whether a retry of the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(OpenRouterError::Network("reset".into()).is_transient());
        assert!(OpenRouterError::Api { status: 429, body: String::new() }.is_transient());
        assert!(OpenRouterError::Api { status: 502, body: String::new() }.is_transient());
        assert!(!OpenRouterError::Api { status: 401, body: String::new() }.is_transient());
        assert!(!OpenRouterError::Config("missing key".into()).is_transient());
    }
}
