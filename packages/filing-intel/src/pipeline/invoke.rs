//! The single call site through which the pipeline talks to a model.

use std::time::Instant;

use tracing::{debug, warn};

use crate::pipeline::prompts::truncate_chars;
use crate::traits::gateway::{ModelGateway, ModelReply, TaskClass};

/// Send `prompt` (capped at `prompt_cap` chars) and turn the outcome into
/// a [`ModelReply`]. Never fails.
pub async fn invoke<G>(gateway: &G, prompt: &str, task: TaskClass, prompt_cap: usize) -> ModelReply
where
    G: ModelGateway + ?Sized,
{
    let prompt = truncate_chars(prompt, prompt_cap);
    let start = Instant::now();

    let reply = ModelReply::from(gateway.complete(prompt, task).await);

    match reply.error() {
        None => debug!(
            %task,
            prompt_chars = prompt.len(),
            reply_chars = reply.text().len(),
            duration_ms = start.elapsed().as_millis(),
            "Model call completed"
        ),
        Some(error) => warn!(
            %task,
            error,
            duration_ms = start.elapsed().as_millis(),
            "Model call failed"
        ),
    }

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGateway, MockGatewayCall};

    #[tokio::test]
    async fn test_invoke_applies_outer_cap() {
        let gateway = MockGateway::new().with_default_reply("ok");
        let prompt = "x".repeat(500);

        let reply = invoke(&gateway, &prompt, TaskClass::Analysis, 100).await;

        assert!(reply.is_success());
        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        let MockGatewayCall { prompt, task } = &calls[0];
        assert_eq!(prompt.chars().count(), 100);
        assert_eq!(*task, TaskClass::Analysis);
    }

    #[tokio::test]
    async fn test_invoke_converts_failure_to_value() {
        let gateway = MockGateway::new().fail_when_prompt_contains("boom");

        let reply = invoke(&gateway, "boom", TaskClass::Default, 1000).await;

        assert!(!reply.is_success());
        assert!(reply.error().is_some());
    }
}
