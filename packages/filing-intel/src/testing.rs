//! Testing utilities including mock implementations.
//!
//! These are useful for exercising the pipeline without making real model
//! or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{FilingError, Result};
use crate::traits::{
    gateway::{ModelGateway, TaskClass},
    issuer::IssuerInfoProvider,
};
use crate::types::metadata::IssuerInfo;

/// Default reply for prompts with no scripted answer.
pub const MOCK_REPLY: &str = "Mock model reply";

/// A mock model gateway.
///
/// Replies are scripted by prompt substring: the first rule whose needle
/// occurs in the prompt decides the outcome. Unmatched prompts get the
/// default reply.
#[derive(Clone)]
pub struct MockGateway {
    /// (needle, reply) in registration order
    replies: Arc<RwLock<Vec<(String, String)>>>,

    /// Needles that make the call fail
    failures: Arc<RwLock<Vec<String>>>,

    default_reply: Arc<RwLock<String>>,

    /// Artificial latency per call
    delay: Option<Duration>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockGatewayCall>>>,
}

/// Record of a call made to the mock gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockGatewayCall {
    pub prompt: String,
    pub task: TaskClass,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            replies: Arc::default(),
            failures: Arc::default(),
            default_reply: Arc::new(RwLock::new(MOCK_REPLY.to_string())),
            delay: None,
            calls: Arc::default(),
        }
    }
}

impl MockGateway {
    /// Create a new mock gateway with default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `reply` to any prompt containing `needle`.
    pub fn with_reply(self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies
            .write()
            .unwrap()
            .push((needle.into(), reply.into()));
        self
    }

    /// Reply for prompts no rule matches. An empty string simulates a
    /// model that returns nothing.
    pub fn with_default_reply(self, reply: impl Into<String>) -> Self {
        *self.default_reply.write().unwrap() = reply.into();
        self
    }

    /// Fail any call whose prompt contains `needle`.
    pub fn fail_when_prompt_contains(self, needle: impl Into<String>) -> Self {
        self.failures.write().unwrap().push(needle.into());
        self
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockGatewayCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls whose prompt contains `needle`.
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| call.prompt.contains(needle))
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn complete(&self, prompt: &str, task: TaskClass) -> Result<String> {
        self.calls.write().unwrap().push(MockGatewayCall {
            prompt: prompt.to_string(),
            task,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures
            .read()
            .unwrap()
            .iter()
            .find(|needle| prompt.contains(needle.as_str()))
            .cloned();
        if let Some(needle) = failing {
            return Err(FilingError::Gateway(
                format!("mock failure for prompt containing {:?}", needle).into(),
            ));
        }

        let scripted = self
            .replies
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        Ok(scripted.unwrap_or_else(|| self.default_reply.read().unwrap().clone()))
    }
}

/// A mock issuer info provider keyed by CIK.
#[derive(Default, Clone)]
pub struct MockIssuerProvider {
    issuers: Arc<RwLock<HashMap<String, IssuerInfo>>>,
    fail: bool,
    lookups: Arc<RwLock<Vec<String>>>,
}

impl MockIssuerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Know `info` under `cik`.
    pub fn with_issuer(self, cik: impl Into<String>, info: IssuerInfo) -> Self {
        self.issuers.write().unwrap().insert(cik.into(), info);
        self
    }

    /// Make every lookup fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// CIKs looked up so far.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.read().unwrap().clone()
    }
}

#[async_trait]
impl IssuerInfoProvider for MockIssuerProvider {
    async fn lookup(&self, cik: &str) -> Result<Option<IssuerInfo>> {
        self.lookups.write().unwrap().push(cik.to_string());
        if self.fail {
            return Err(FilingError::IssuerLookup(
                format!("mock lookup failure for {}", cik).into(),
            ));
        }
        Ok(self.issuers.read().unwrap().get(cik).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_reply_by_substring() {
        let gateway = MockGateway::new()
            .with_reply("Summarize", "a summary")
            .with_reply("assessment", "an assessment");

        let reply = gateway
            .complete("Summarize the following", TaskClass::Summarization)
            .await
            .unwrap();
        assert_eq!(reply, "a summary");

        let reply = gateway.complete("other", TaskClass::Default).await.unwrap();
        assert_eq!(reply, MOCK_REPLY);
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_rule_wins_over_reply() {
        let gateway = MockGateway::new()
            .with_reply("Item 2.02", "fine")
            .fail_when_prompt_contains("Item 2.02");

        let result = gateway.complete("Item 2.02 text", TaskClass::Analysis).await;
        assert!(matches!(result, Err(FilingError::Gateway(_))));
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let gateway = MockGateway::new();
        let clone = gateway.clone();
        clone.complete("x", TaskClass::Default).await.unwrap();
        assert_eq!(gateway.calls_containing("x"), 1);
        gateway.clear_calls();
        assert!(clone.calls().is_empty());
    }

    #[tokio::test]
    async fn test_issuer_provider() {
        let info = IssuerInfo {
            name: Some("Apple Inc.".to_string()),
            ..Default::default()
        };
        let provider = MockIssuerProvider::new().with_issuer("0000320193", info);

        let found = provider.lookup("0000320193").await.unwrap();
        assert_eq!(found.unwrap().name.as_deref(), Some("Apple Inc."));
        assert!(provider.lookup("42").await.unwrap().is_none());
        assert_eq!(provider.lookups(), vec!["0000320193", "42"]);

        assert!(MockIssuerProvider::new().failing().lookup("1").await.is_err());
    }
}
