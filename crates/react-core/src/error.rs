//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A tool with this name is already registered
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// LLM output was neither a final answer nor a valid action
    #[error("Could not parse LLM output: {reason}")]
    DecisionParse { reason: String, raw: String },

    /// A single call exceeded its deadline
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Every attempt against an external service timed out
    #[error("{service} timed out after {attempts} attempt(s)")]
    ExternalServiceTimeout { service: String, attempts: u32 },

    /// The loop proposed more actions than allowed
    #[error("Step limit ({0}) exceeded")]
    StepLimitExceeded(usize),

    /// Cooperative cancellation; never surfaced as a run failure
    #[error("Run cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Timeout(_)
        )
    }

    /// Errors that must end the run even when raised by a tool
    pub const fn is_fatal_for_tools(&self) -> bool {
        matches!(self, Self::Cancelled | Self::ExternalServiceTimeout { .. })
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::ToolExecution(msg) => format!("Tool error: {msg}"),
            Self::DecisionParse { .. } => {
                "The AI service returned a response that could not be understood.".into()
            }
            Self::ExternalServiceTimeout { service, .. } => {
                format!("{service} did not respond in time. Please try again later.")
            }
            Self::StepLimitExceeded(_) => {
                "The request took too many steps to process. Please try a simpler query.".into()
            }
            Self::Cancelled => "The request was cancelled.".into(),
            Self::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(AgentError::Timeout(std::time::Duration::from_secs(1)).is_retryable());
        assert!(AgentError::RateLimited("slow down".into()).is_retryable());
        assert!(!AgentError::ToolExecution("boom".into()).is_retryable());
        assert!(
            !AgentError::DecisionParse {
                reason: "no action".into(),
                raw: String::new(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_fatal_for_tools() {
        assert!(AgentError::Cancelled.is_fatal_for_tools());
        assert!(
            AgentError::ExternalServiceTimeout {
                service: "tool 'x'".into(),
                attempts: 2,
            }
            .is_fatal_for_tools()
        );
        assert!(!AgentError::ToolExecution("boom".into()).is_fatal_for_tools());
    }

    #[test]
    fn test_from_anyhow() {
        let err: AgentError = anyhow::anyhow!("disk full").context("writing transcript").into();
        assert!(matches!(&err, AgentError::Other(msg) if msg == "writing transcript"));
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "An unexpected error occurred.");
    }
}
