//! react-agent CLI
//!
//! Wires the ReAct loop to Ollama, the clock tool and (when configured)
//! Tavily web search, answers one question and prints the result.
//! Ctrl-C cancels the run cooperatively.

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use react_core::{
    AgentBuilder, CancellationToken, LlmProvider, RunOutcome, tool::CurrentTimeTool,
};
use react_runtime::{OllamaProvider, TavilySearchTool};

use crate::config::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before clap reads env-backed flags
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Initialize LLM provider
    let provider = Arc::new(OllamaProvider::from_env());

    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("Connected to Ollama at {}", provider.config().base_url());
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::debug!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("Ollama not available - the run will likely fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    // Initialize tools
    let mut builder = AgentBuilder::new()
        .provider(provider)
        .config(cli.agent_config())
        .tool(CurrentTimeTool::new());

    if cli.no_search {
        tracing::info!("Web search disabled");
    } else {
        match TavilySearchTool::from_env() {
            Ok(search) => builder = builder.tool(search),
            Err(e) => tracing::warn!("Web search unavailable: {}", e),
        }
    }

    let agent = builder.build().context("failed to build agent")?;
    tracing::info!("Registered {} tool(s): {}", agent.tools().len(), agent.tools().names().join(", "));

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling run");
            on_ctrl_c.cancel();
        }
    });

    let question = cli.question();
    tracing::info!("Question: {}", question);

    match agent.run_with_cancel(&question, &cancel).await {
        Ok(RunOutcome::Finished { answer, state }) => {
            tracing::info!("Answered after {} tool call(s)", state.steps());
            println!("{answer}");
            Ok(())
        }
        Ok(RunOutcome::Cancelled { state }) => {
            tracing::warn!("Cancelled after {} tool call(s)", state.steps());
            Ok(())
        }
        Err(failure) => {
            for (i, step) in failure.state.history().iter().enumerate() {
                tracing::info!(
                    "  step {}: {}({}) -> {}",
                    i + 1,
                    step.action.tool_name,
                    step.action.tool_input,
                    step.observation
                );
            }
            eprintln!("{}", failure.error.user_message());
            Err(failure.into())
        }
    }
}
