//! # react-runtime
//!
//! Concrete collaborators for the ReAct loop.
//!
//! ## Providers
//!
//! - **Ollama** (default): Local LLM inference via Ollama's HTTP API
//!
//! ## Tools
//!
//! - **Tavily** (default): Web search returning a text summary
//!
//! ## Usage
//!
//! ```rust,ignore
//! use react_runtime::{OllamaProvider, TavilySearchTool};
//!
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(OllamaProvider::from_env()))
//!     .tool(CurrentTimeTool::new())
//!     .tool(TavilySearchTool::from_env()?)
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "tavily")]
pub mod tavily;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

#[cfg(feature = "tavily")]
pub use tavily::{TavilyConfig, TavilySearchTool};

// Re-export core types for convenience
pub use react_core::{
    AgentBuilder, AgentError, CancellationToken, LlmProvider, ReactAgent, Result, RunOutcome,
    Tool, ToolRegistry,
};
