//! Decision Engine
//!
//! One reasoning step: render the prompt from the current state, ask the
//! LLM, parse the reply.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::parser;
use crate::prompt::PromptTemplate;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::retry::{RetryPolicy, call_with_retry};
use crate::state::{AgentState, Outcome};

/// Wraps the LLM call that picks the next step
pub struct DecisionEngine {
    provider: Arc<dyn LlmProvider>,
    prompt: Arc<dyn PromptTemplate>,
    options: GenerationOptions,
    timeout: Duration,
    retry: RetryPolicy,
}

impl DecisionEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        prompt: Arc<dyn PromptTemplate>,
        options: GenerationOptions,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            prompt,
            options,
            timeout,
            retry,
        }
    }

    /// Decide the next outcome for `state`
    pub async fn decide(&self, state: &AgentState, cancel: &CancellationToken) -> Result<Outcome> {
        let prompt = self.prompt.render(state.input(), state.history());
        let service = format!("LLM provider '{}'", self.provider.name());

        let completion = call_with_retry(&service, &self.retry, self.timeout, cancel, || {
            self.provider.complete(&prompt, &self.options)
        })
        .await?;

        tracing::debug!(
            run_id = %state.run_id(),
            model = %completion.model,
            chars = completion.content.len(),
            "LLM replied"
        );

        parser::parse(&completion.content)
    }
}
