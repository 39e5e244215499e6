//! Command-line configuration

use std::time::Duration;

use clap::Parser;
use react_core::{AgentConfig, provider::GenerationOptions, retry::RetryPolicy};

const DEFAULT_QUESTION: &str =
    "What is the current time in New York and who is the president of the United States?";

#[derive(Debug, Parser)]
#[command(name = "react-agent")]
#[command(about = "Answer a question with a ReAct agent backed by Ollama", version)]
pub struct Cli {
    /// Question to answer
    #[arg(default_value = DEFAULT_QUESTION)]
    pub question: Vec<String>,

    /// Ollama model
    #[arg(short, long, env = "REACT_MODEL", default_value = "llama3.2")]
    pub model: String,

    /// Maximum tool executions before giving up
    #[arg(long, env = "REACT_MAX_STEPS", default_value_t = 10)]
    pub max_steps: usize,

    /// Per-call LLM timeout, in seconds
    #[arg(long, env = "REACT_LLM_TIMEOUT", default_value_t = 120)]
    pub llm_timeout: u64,

    /// Per-call tool timeout, in seconds
    #[arg(long, env = "REACT_TOOL_TIMEOUT", default_value_t = 30)]
    pub tool_timeout: u64,

    /// Attempts per external call, including the first
    #[arg(long, env = "REACT_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: u32,

    /// Skip the web search tool even if TAVILY_API_KEY is set
    #[arg(long)]
    pub no_search: bool,
}

impl Cli {
    pub fn question(&self) -> String {
        self.question.join(" ")
    }

    pub fn agent_config(&self) -> AgentConfig {
        let retry = RetryPolicy {
            max_attempts: self.max_attempts,
            ..RetryPolicy::default()
        };

        AgentConfig {
            max_steps: self.max_steps,
            llm_timeout: Duration::from_secs(self.llm_timeout),
            tool_timeout: Duration::from_secs(self.tool_timeout),
            llm_retry: retry.clone(),
            tool_retry: retry,
            generation: GenerationOptions {
                model: self.model.clone(),
                ..GenerationOptions::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["react-agent"]);
        assert_eq!(cli.question(), DEFAULT_QUESTION);

        let config = cli.agent_config();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.llm_timeout, Duration::from_secs(120));
        assert_eq!(config.llm_retry.max_attempts, 3);
    }

    #[test]
    fn test_question_words_are_joined() {
        let cli = Cli::parse_from(["react-agent", "--max-steps", "3", "What", "time", "is", "it?"]);
        assert_eq!(cli.question(), "What time is it?");
        assert_eq!(cli.agent_config().max_steps, 3);
    }
}
