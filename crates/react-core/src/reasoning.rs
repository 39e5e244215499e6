//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern as an explicit state machine:
//!
//! ```text
//! REASONING --decide()--> DONE       (FinalAnswer)
//! REASONING --decide()--> ACTING     (PendingAction)
//! ACTING    --act()-----> REASONING  (history grows by one)
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::act::ActExecutor;
use crate::decision::DecisionEngine;
use crate::error::{AgentError, Result};
use crate::prompt::{PromptTemplate, ReactPrompt};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::retry::RetryPolicy;
use crate::state::{AgentState, Outcome, PendingAction, Step};
use crate::tool::{Tool, ToolRegistry};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum tool executions per run
    pub max_steps: usize,

    /// Deadline for a single LLM call
    pub llm_timeout: Duration,

    /// Deadline for a single tool call
    pub tool_timeout: Duration,

    pub llm_retry: RetryPolicy,
    pub tool_retry: RetryPolicy,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            llm_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(30),
            llm_retry: RetryPolicy::default(),
            tool_retry: RetryPolicy::default(),
            generation: GenerationOptions::default(),
        }
    }
}

/// How a run ended, when it did not fail
#[derive(Clone, Debug)]
pub enum RunOutcome {
    Finished { answer: String, state: AgentState },
    Cancelled { state: AgentState },
}

impl RunOutcome {
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Finished { answer, .. } => Some(answer),
            Self::Cancelled { .. } => None,
        }
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub const fn state(&self) -> &AgentState {
        match self {
            Self::Finished { state, .. } | Self::Cancelled { state } => state,
        }
    }

    pub fn history(&self) -> &[Step] {
        self.state().history()
    }
}

/// A run that ended abnormally, with the partial state for diagnostics
#[derive(Debug, Error)]
#[error("ReAct run failed after {} step(s): {error}", .state.steps())]
pub struct RunFailure {
    #[source]
    pub error: AgentError,
    pub state: AgentState,
}

enum Phase {
    Reasoning,
    Acting(PendingAction),
    Done(String),
}

/// The main agent: owns the decision engine and the act executor
pub struct ReactAgent {
    engine: DecisionEngine,
    executor: ActExecutor,
    config: AgentConfig,
}

impl ReactAgent {
    /// Create a new agent with the standard ReAct prompt
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        let prompt = Arc::new(ReactPrompt::new(&tools));
        Self::with_prompt(provider, tools, prompt, config)
    }

    /// Create with a custom prompt template
    pub fn with_prompt(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        prompt: Arc<dyn PromptTemplate>,
        config: AgentConfig,
    ) -> Self {
        let engine = DecisionEngine::new(
            provider,
            prompt,
            config.generation.clone(),
            config.llm_timeout,
            config.llm_retry.clone(),
        );
        let executor = ActExecutor::new(tools, config.tool_timeout, config.tool_retry.clone());
        Self {
            engine,
            executor,
            config,
        }
    }

    /// Run the loop to completion
    pub async fn run(&self, input: &str) -> std::result::Result<RunOutcome, RunFailure> {
        self.run_with_cancel(input, &CancellationToken::new()).await
    }

    /// Run the loop, stopping early once `cancel` fires
    pub async fn run_with_cancel(
        &self,
        input: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<RunOutcome, RunFailure> {
        let mut state = AgentState::new(input);
        let mut phase = Phase::Reasoning;

        tracing::info!(run_id = %state.run_id(), max_steps = self.config.max_steps, "Starting ReAct run");

        loop {
            phase = match phase {
                Phase::Reasoning => {
                    if cancel.is_cancelled() {
                        return Ok(cancelled(state));
                    }

                    match self.engine.decide(&state, cancel).await {
                        Ok(outcome) => {
                            state.set_outcome(outcome.clone());
                            match outcome {
                                Outcome::FinalAnswer(answer) => Phase::Done(answer.text),
                                Outcome::PendingAction(action) => Phase::Acting(action),
                            }
                        }
                        Err(AgentError::Cancelled) => return Ok(cancelled(state)),
                        Err(error) => return Err(fail(error, state)),
                    }
                }
                Phase::Acting(action) => {
                    if cancel.is_cancelled() {
                        return Ok(cancelled(state));
                    }
                    if state.steps() >= self.config.max_steps {
                        return Err(fail(
                            AgentError::StepLimitExceeded(self.config.max_steps),
                            state,
                        ));
                    }

                    tracing::debug!(
                        run_id = %state.run_id(),
                        step = state.steps() + 1,
                        tool = %action.tool_name,
                        input = %action.tool_input,
                        "Executing tool"
                    );

                    match self.executor.act(&action, cancel).await {
                        Ok(observation) => {
                            state.record(action, observation);
                            Phase::Reasoning
                        }
                        Err(AgentError::Cancelled) => return Ok(cancelled(state)),
                        Err(error) => return Err(fail(error, state)),
                    }
                }
                Phase::Done(answer) => {
                    tracing::info!(run_id = %state.run_id(), steps = state.steps(), "ReAct run finished");
                    return Ok(RunOutcome::Finished { answer, state });
                }
            };
        }
    }

    /// Run and return only the answer text
    pub async fn ask(&self, question: &str) -> Result<String> {
        match self.run(question).await {
            Ok(RunOutcome::Finished { answer, .. }) => Ok(answer),
            Ok(RunOutcome::Cancelled { .. }) => Err(AgentError::Cancelled),
            Err(failure) => Err(failure.error),
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        self.executor.tools()
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

fn cancelled(state: AgentState) -> RunOutcome {
    tracing::info!(run_id = %state.run_id(), steps = state.steps(), "ReAct run cancelled");
    RunOutcome::Cancelled { state }
}

fn fail(error: AgentError, state: AgentState) -> RunFailure {
    tracing::error!(run_id = %state.run_id(), steps = state.steps(), error = %error, "ReAct run failed");
    RunFailure { error, state }
}

/// Builder for [`ReactAgent`]
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Vec<Arc<dyn Tool>>,
    prompt: Option<Arc<dyn PromptTemplate>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Vec::new(),
            prompt: None,
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    #[must_use]
    pub fn tool_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: Arc<dyn PromptTemplate>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_steps(mut self, max: usize) -> Self {
        self.config.max_steps = max;
        self
    }

    #[must_use]
    pub const fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.config.llm_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = timeout;
        self
    }

    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.llm_retry = policy.clone();
        self.config.tool_retry = policy;
        self
    }

    /// Register the tools, freeze the registry and build the agent
    pub fn build(self) -> Result<ReactAgent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let mut registry = ToolRegistry::new();
        for tool in self.tools {
            registry.register_arc(tool)?;
        }
        let tools = Arc::new(registry);

        Ok(match self.prompt {
            Some(prompt) => ReactAgent::with_prompt(provider, tools, prompt, self.config),
            None => ReactAgent::new(provider, tools, self.config),
        })
    }
}
