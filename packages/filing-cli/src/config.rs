//! CLI configuration.
//!
//! Secrets and endpoints come from the environment (a `.env` file is
//! loaded if present). Pipeline tuning comes from an optional JSON file
//! layered over the library defaults.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use filing_intel::PipelineConfig;
use std::env;
use std::path::Path;

pub const DEFAULT_APP_TITLE: &str = "SEC Insights Tool";
pub const DEFAULT_REFERER: &str = "https://sec-insights.example.com";
pub const DEFAULT_SEC_USER_AGENT: &str = "SEC-Insights-Tool/1.0 (contact@example.com)";

/// Configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: Option<String>,
    pub app_title: String,
    pub referer: String,
    pub sec_user_agent: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        // Load .env file if present (development)
        let _ = dotenv();

        Self {
            openrouter_api_key: env::var("OPENROUTER_API_KEY").ok().filter(|k| !k.is_empty()),
            openrouter_base_url: env::var("OPENROUTER_BASE_URL").ok(),
            app_title: env::var("OPENROUTER_APP_TITLE")
                .unwrap_or_else(|_| DEFAULT_APP_TITLE.to_string()),
            referer: env::var("OPENROUTER_REFERER").unwrap_or_else(|_| DEFAULT_REFERER.to_string()),
            sec_user_agent: env::var("SEC_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_SEC_USER_AGENT.to_string()),
        }
    }

    /// API key, required only by commands that call the model.
    pub fn require_api_key(&self) -> Result<&str> {
        self.openrouter_api_key
            .as_deref()
            .context("OPENROUTER_API_KEY must be set")
    }
}

/// Pipeline config from a JSON file, or the defaults.
pub fn load_pipeline_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    PipelineConfig::from_json(&json)
        .with_context(|| format!("Invalid pipeline config in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_path_uses_defaults() {
        let config = load_pipeline_config(None).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_unreadable_config_path_is_error() {
        let err = load_pipeline_config(Some(Path::new("/nonexistent/pipeline.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_require_api_key() {
        let config = Config {
            openrouter_api_key: None,
            openrouter_base_url: None,
            app_title: DEFAULT_APP_TITLE.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            sec_user_agent: DEFAULT_SEC_USER_AGENT.to_string(),
        };
        assert!(config.require_api_key().is_err());
    }
}
