//! Model gateway trait.
//!
//! The gateway abstracts one generative-text completion: prompt in, free
//! text out. Model selection, authentication and transport retries belong
//! to the implementation. The pipeline never lets a gateway error escape;
//! it converts every outcome into a [`ModelReply`] at the call site.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of work a prompt asks for; gateways map it to a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskClass {
    #[default]
    Default,
    Analysis,
    Summarization,
    Classification,
}

impl TaskClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Analysis => "analysis",
            Self::Summarization => "summarization",
            Self::Classification => "classification",
        }
    }
}

impl fmt::Display for TaskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generative text completion service.
///
/// Implementations must be re-entrant: the analyzer issues several calls
/// concurrently against one shared gateway.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Complete `prompt` with the model configured for `task`.
    async fn complete(&self, prompt: &str, task: TaskClass) -> Result<String>;
}

#[async_trait]
impl<G: ModelGateway + ?Sized> ModelGateway for Arc<G> {
    async fn complete(&self, prompt: &str, task: TaskClass) -> Result<String> {
        (**self).complete(prompt, task).await
    }
}

/// Outcome of one model call, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// The model returned non-empty text.
    Completed(String),

    /// Transport failure or empty reply.
    Failed(String),
}

impl ModelReply {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Reply text; empty for failures.
    pub fn text(&self) -> &str {
        match self {
            Self::Completed(text) => text,
            Self::Failed(_) => "",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(error) => Some(error),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Completed(text) => text,
            Self::Failed(_) => String::new(),
        }
    }
}

impl From<Result<String>> for ModelReply {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) if text.trim().is_empty() => Self::Failed("empty response".to_string()),
            Ok(text) => Self::Completed(text),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}
