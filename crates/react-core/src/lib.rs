//! # react-core
//!
//! ReAct (Reason + Act) agent loop with a provider-agnostic decision engine
//! and a read-only tool registry.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ReactAgent (loop)                        │
//! │                                                              │
//! │   REASONING ──decide()──► ACTING ──act()──► REASONING ...    │
//! │       │                                                      │
//! │       └──FinalAnswer──► DONE                                 │
//! │                                                              │
//! │  ┌────────────────┐  ┌──────────────┐  ┌─────────────────┐   │
//! │  │ DecisionEngine │  │ ActExecutor  │  │  ToolRegistry   │   │
//! │  │ prompt+parser  │  │ timeout/retry│──│  (Arc, frozen)  │   │
//! │  └───────┬────────┘  └──────────────┘  └─────────────────┘   │
//! │          │                                                   │
//! │  ┌───────▼────────┐                                          │
//! │  │  LlmProvider   │  (Ollama, scripted fakes, ...)           │
//! │  └────────────────┘                                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each call to [`ReactAgent::run`] owns an independent [`AgentState`]; the
//! agent itself is immutable and can be shared between concurrent runs.

pub mod act;
pub mod decision;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod reasoning;
pub mod retry;
pub mod state;
pub mod tool;

pub use error::{AgentError, Result};
pub use provider::LlmProvider;
pub use reasoning::{AgentBuilder, AgentConfig, ReactAgent, RunFailure, RunOutcome};
pub use state::{AgentState, FinalAnswer, Outcome, PendingAction, Step, ToolInput};
pub use tool::{InputShape, Tool, ToolArgs, ToolRegistry, ToolSchema};
pub use tokio_util::sync::CancellationToken;
