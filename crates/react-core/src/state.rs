//! Agent State
//!
//! The single record threaded through one run of the reason/act loop.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input proposed for a tool call: one scalar value or a key/value mapping
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolInput {
    /// Key/value arguments, handed to the tool as keyword arguments
    Structured(serde_json::Map<String, serde_json::Value>),
    /// A single value (string, number, `null`, ...), handed over positionally
    Scalar(serde_json::Value),
}

impl ToolInput {
    /// No input at all
    pub const fn none() -> Self {
        Self::Scalar(serde_json::Value::Null)
    }

    /// Scalar string input
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(serde_json::Value::String(value.into()))
    }
}

impl From<serde_json::Value> for ToolInput {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::Structured(map),
            other => Self::Scalar(other),
        }
    }
}

impl std::fmt::Display for ToolInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured(map) => write!(f, "{}", serde_json::Value::Object(map.clone())),
            Self::Scalar(serde_json::Value::String(s)) => f.write_str(s),
            Self::Scalar(serde_json::Value::Null) => f.write_str("None"),
            Self::Scalar(other) => write!(f, "{other}"),
        }
    }
}

/// An action the decision engine wants executed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub tool_name: String,
    pub tool_input: ToolInput,

    /// Raw reasoning text that produced this action, replayed in the scratchpad
    #[serde(default)]
    pub log: String,
}

impl PendingAction {
    pub fn new(tool_name: impl Into<String>, tool_input: ToolInput) -> Self {
        let tool_name = tool_name.into();
        let log = format!("Action: {tool_name}\nAction Input: {tool_input}");
        Self {
            tool_name,
            tool_input,
            log,
        }
    }

    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.log = log.into();
        self
    }
}

/// Terminal answer produced by the decision engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswer {
    pub text: String,
    #[serde(default)]
    pub log: String,
}

impl FinalAnswer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let log = format!("Final Answer: {text}");
        Self { text, log }
    }
}

/// Result of one decision: exactly one of the two variants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    PendingAction(PendingAction),
    FinalAnswer(FinalAnswer),
}

impl Outcome {
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::FinalAnswer(_))
    }
}

/// A completed act step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub action: PendingAction,
    pub observation: String,
}

/// State owned by a single run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentState {
    run_id: Uuid,
    input: String,
    outcome: Option<Outcome>,
    history: Vec<Step>,
}

impl AgentState {
    /// Fresh state for a new run: empty history, no outcome yet
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            input: input.into(),
            outcome: None,
            history: Vec::new(),
        }
    }

    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub const fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn history(&self) -> &[Step] {
        &self.history
    }

    /// Number of completed act steps
    pub fn steps(&self) -> usize {
        self.history.len()
    }

    pub(crate) fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }

    pub(crate) fn record(&mut self, action: PendingAction, observation: String) {
        self.history.push(Step {
            action,
            observation,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_state_is_empty() {
        let state = AgentState::new("What time is it?");
        assert_eq!(state.input(), "What time is it?");
        assert!(state.outcome().is_none());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_record_appends_in_order() {
        let mut state = AgentState::new("q");
        state.record(PendingAction::new("a", ToolInput::none()), "first".into());
        state.record(PendingAction::new("b", ToolInput::text("x")), "second".into());

        let names: Vec<_> = state.history().iter().map(|s| s.action.tool_name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(state.steps(), 2);
    }

    #[test]
    fn test_tool_input_from_value() {
        assert!(matches!(ToolInput::from(json!({"q": 1})), ToolInput::Structured(_)));
        assert_eq!(ToolInput::from(json!("x")), ToolInput::text("x"));
        assert_eq!(ToolInput::from(json!(null)), ToolInput::none());
    }

    #[test]
    fn test_tool_input_display() {
        assert_eq!(ToolInput::none().to_string(), "None");
        assert_eq!(ToolInput::text("rust").to_string(), "rust");
        assert_eq!(ToolInput::from(json!({"a": 1})).to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = Outcome::FinalAnswer(FinalAnswer::new("done"));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["type"], "final_answer");
        assert!(outcome.is_final());
    }
}
