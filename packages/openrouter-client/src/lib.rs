//! Minimal OpenRouter REST client
//!
//! A thin client for OpenRouter's OpenAI-compatible chat-completions
//! endpoint. It knows nothing about filings or prompts; callers pick the
//! model per request.
//!
//! # Example
//!
//! ```rust,ignore
//! use openrouter_client::{ChatRequest, Message, OpenRouterClient};
//!
//! let client = OpenRouterClient::from_env()?.with_app_title("SEC Insights Tool");
//!
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new("mistralai/mistral-7b-instruct:free")
//!             .message(Message::user("Hello!"))
//!             .max_tokens(256),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenRouterError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Default OpenRouter API base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter API client.
#[derive(Clone)]
pub struct OpenRouterClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    referer: Option<String>,
    app_title: Option<String>,
}

impl OpenRouterClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            referer: None,
            app_title: None,
        }
    }

    /// Create from environment variable `OPENROUTER_API_KEY`.
    ///
    /// `OPENROUTER_BASE_URL` overrides the base URL when set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| OpenRouterError::Config("OPENROUTER_API_KEY not set".into()))?;
        let client = Self::new(api_key);
        Ok(match std::env::var("OPENROUTER_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => client.with_base_url(url),
            _ => client,
        })
    }

    /// Set a custom base URL (for proxies or self-hosted gateways).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the `HTTP-Referer` attribution header.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Set the `X-Title` attribution header.
    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = Some(title.into());
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Returns the first choice's content. A response without any choice,
    /// or whose first choice has no content, is an error.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(referer) = &self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.app_title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.json(&request).send().await.map_err(|e| {
            warn!(error = %e, model = %request.model, "OpenRouter request failed");
            OpenRouterError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, model = %request.model, "OpenRouter API error");
            return Err(OpenRouterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenRouterError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OpenRouterError::EmptyCompletion {
                model: request.model.clone(),
            })?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenRouter chat completion"
        );

        Ok(ChatResponse {
            model: raw.model.unwrap_or(request.model),
            content,
            usage: raw.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenRouterClient::new("key").with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_default_base_url() {
        let client = OpenRouterClient::new("key");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = OpenRouterClient::new("key").with_base_url("http://127.0.0.1:1");
        let err = client
            .chat_completion(ChatRequest::new("m").message(Message::user("x")))
            .await
            .unwrap_err();

        assert!(matches!(err, OpenRouterError::Network(_)));
        assert!(err.is_transient());
    }
}
