//! OpenRouter implementation of the model gateway.
//!
//! # Example
//!
//! ```rust,ignore
//! use filing_intel::gateway::OpenRouterGateway;
//!
//! let gateway = OpenRouterGateway::from_env()?;
//! let analyzer = FilingAnalyzer::new(gateway, config)?;
//! ```

use async_trait::async_trait;
use openrouter_client::{ChatRequest, Message, OpenRouterClient};
use tracing::debug;

use crate::error::{FilingError, Result};
use crate::pipeline::prompts::SYSTEM_PROMPT;
use crate::traits::gateway::{ModelGateway, TaskClass};
use crate::types::config::ModelTable;

const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Gateway that picks a model per task class and calls OpenRouter.
#[derive(Clone)]
pub struct OpenRouterGateway {
    client: OpenRouterClient,
    models: ModelTable,
    max_tokens: u32,
    system_prompt: String,
}

impl OpenRouterGateway {
    pub fn new(client: OpenRouterClient) -> Self {
        Self {
            client,
            models: ModelTable::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Create from `OPENROUTER_API_KEY` (and optional `OPENROUTER_BASE_URL`).
    pub fn from_env() -> Result<Self> {
        let client = OpenRouterClient::from_env().map_err(|e| FilingError::Config(e.to_string()))?;
        Ok(Self::new(client))
    }

    /// Replace the task → model table.
    pub fn with_models(mut self, models: ModelTable) -> Self {
        self.models = models;
        self
    }

    /// Set the completion token limit (default: 1024).
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn models(&self) -> &ModelTable {
        &self.models
    }

    fn request(&self, prompt: &str, task: TaskClass) -> ChatRequest {
        ChatRequest::new(self.models.model_for(task))
            .message(Message::system(self.system_prompt.as_str()))
            .message(Message::user(prompt))
            .max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl ModelGateway for OpenRouterGateway {
    async fn complete(&self, prompt: &str, task: TaskClass) -> Result<String> {
        let request = self.request(prompt, task);
        debug!(model = %request.model, %task, "Sending completion request");

        let response = self.client.chat_completion(request).await.map_err(|e| {
            debug!(%task, transient = e.is_transient(), "OpenRouter completion failed");
            FilingError::gateway(e)
        })?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }
        Ok(response.content)
    }
}
