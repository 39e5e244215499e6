//! Act Executor
//!
//! Runs one proposed action against the registry snapshot. Bad tool names
//! and tool failures come back as observations so the next reasoning step
//! can correct itself; only cancellation and exhausted timeouts escape.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::{AgentError, Result};
use crate::retry::{RetryPolicy, call_with_retry};
use crate::state::PendingAction;
use crate::tool::ToolRegistry;

pub struct ActExecutor {
    tools: Arc<ToolRegistry>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ActExecutor {
    pub const fn new(tools: Arc<ToolRegistry>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            tools,
            timeout,
            retry,
        }
    }

    /// Execute `action` and return the observation text
    pub async fn act(&self, action: &PendingAction, cancel: &CancellationToken) -> Result<String> {
        let Ok(tool) = self.tools.resolve(&action.tool_name) else {
            tracing::warn!(tool = %action.tool_name, "Unknown tool requested");
            return Ok(format!("Tool {} not found.", action.tool_name));
        };

        let args = match tool.adapt(&action.tool_input) {
            Ok(args) => args,
            Err(e) => return Ok(failure_observation(&action.tool_name, &e)),
        };

        let service = format!("tool '{}'", tool.name());
        let result = call_with_retry(&service, &self.retry, self.timeout, cancel, || {
            AssertUnwindSafe(tool.invoke(args.clone()))
                .catch_unwind()
                .map(|res| res.unwrap_or_else(|payload| Err(panic_error(payload.as_ref()))))
        })
        .await;

        match result {
            Ok(observation) => {
                tracing::debug!(tool = %action.tool_name, "Tool returned");
                Ok(observation)
            }
            Err(e) if e.is_fatal_for_tools() => Err(e),
            Err(e) => {
                tracing::warn!(tool = %action.tool_name, error = %e, "Tool failed");
                Ok(failure_observation(&action.tool_name, &e))
            }
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

fn failure_observation(tool: &str, err: &AgentError) -> String {
    format!("Tool {tool} failed: {err}")
}

fn panic_error(payload: &(dyn Any + Send)) -> AgentError {
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into());
    AgentError::ToolExecution(format!("panicked: {msg}"))
}
