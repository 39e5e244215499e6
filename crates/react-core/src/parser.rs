//! ReAct Output Parser
//!
//! Turns raw LLM text into an [`Outcome`]. Anything that is not clearly a
//! final answer or a well-formed action is a [`AgentError::DecisionParse`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{AgentError, Result};
use crate::state::{FinalAnswer, Outcome, PendingAction, ToolInput};

const FINAL_ANSWER: &str = "Final Answer:";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action regex is valid")
});

static ACTION_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Action\s*\d*\s*:").expect("action regex is valid"));

/// Fenced JSON tool call: ```` ```tool {"tool": ..., "arguments": ...} ``` ````
#[derive(Debug, Deserialize)]
struct FencedToolCall {
    tool: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// Parse one LLM reply
pub fn parse(text: &str) -> Result<Outcome> {
    let has_final = text.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if has_final {
            return Err(parse_error(
                "reply contains both an action and a final answer",
                text,
            ));
        }

        let tool_name = caps[1].trim().trim_matches('*').trim().to_string();
        if tool_name.is_empty() {
            return Err(parse_error("action name is empty", text));
        }

        let tool_input = parse_action_input(&caps[2]);
        let log = text.trim_end().to_string();
        return Ok(Outcome::PendingAction(
            PendingAction::new(tool_name, tool_input).with_log(log),
        ));
    }

    if has_final {
        let answer = text
            .split(FINAL_ANSWER)
            .last()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(Outcome::FinalAnswer(FinalAnswer {
            text: answer,
            log: text.trim_end().to_string(),
        }));
    }

    if let Some(call) = parse_fenced_tool_call(text) {
        let log = text.trim_end().to_string();
        return Ok(Outcome::PendingAction(
            PendingAction::new(call.tool, ToolInput::from(call.arguments)).with_log(log),
        ));
    }

    if ACTION_ONLY_RE.is_match(text) {
        return Err(parse_error("'Action:' is not followed by 'Action Input:'", text));
    }

    Err(parse_error(
        "reply contains neither 'Action:' nor 'Final Answer:'",
        text,
    ))
}

/// Action input: JSON objects become structured input, anything else a scalar
fn parse_action_input(raw: &str) -> ToolInput {
    let trimmed = raw.trim();

    if trimmed.starts_with('{') {
        if let Ok(value @ serde_json::Value::Object(_)) = serde_json::from_str(trimmed) {
            return ToolInput::from(value);
        }
    }

    let unquoted = trimmed.trim_matches('"').trim();
    match unquoted {
        "" | "None" | "none" | "null" => ToolInput::none(),
        other => ToolInput::text(other),
    }
}

fn parse_fenced_tool_call(text: &str) -> Option<FencedToolCall> {
    let tool_start = "```tool";
    let start_idx = text.find(tool_start)?;
    let after_marker = &text[start_idx + tool_start.len()..];
    let end_idx = after_marker.find("```")?;
    serde_json::from_str(after_marker[..end_idx].trim()).ok()
}

fn parse_error(reason: &str, raw: &str) -> AgentError {
    AgentError::DecisionParse {
        reason: reason.to_string(),
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(outcome: Outcome) -> PendingAction {
        match outcome {
            Outcome::PendingAction(action) => action,
            Outcome::FinalAnswer(answer) => panic!("expected action, got {answer:?}"),
        }
    }

    #[test]
    fn test_parse_final_answer() {
        let outcome = parse(" I now know the final answer\nFinal Answer: It is noon.").unwrap();
        assert_eq!(outcome, Outcome::FinalAnswer(FinalAnswer {
            text: "It is noon.".into(),
            log: " I now know the final answer\nFinal Answer: It is noon.".into(),
        }));
    }

    #[test]
    fn test_parse_scalar_action() {
        let text = " I should search.\nAction: tavily_search\nAction Input: \"president of the USA\"";
        let action = action(parse(text).unwrap());

        assert_eq!(action.tool_name, "tavily_search");
        assert_eq!(action.tool_input, ToolInput::text("president of the USA"));
        assert_eq!(action.log, text);
    }

    #[test]
    fn test_parse_action_without_input_value() {
        let action = action(parse("Action: current_time\nAction Input: None").unwrap());
        assert_eq!(action.tool_name, "current_time");
        assert_eq!(action.tool_input, ToolInput::none());
    }

    #[test]
    fn test_parse_structured_action() {
        let action =
            action(parse("Action: weather\nAction Input: {\"city\": \"Oslo\", \"days\": 2}").unwrap());
        assert_eq!(
            action.tool_input,
            ToolInput::from(json!({"city": "Oslo", "days": 2}))
        );
    }

    #[test]
    fn test_parse_fenced_tool_block() {
        let text = "Let me check.\n```tool\n{\"tool\": \"current_time\", \"arguments\": {}}\n```";
        let action = action(parse(text).unwrap());
        assert_eq!(action.tool_name, "current_time");
        assert_eq!(action.tool_input, ToolInput::Structured(serde_json::Map::new()));
    }

    #[test]
    fn test_both_action_and_answer_is_error() {
        let err = parse("Action: x\nAction Input: y\nFinal Answer: z").unwrap_err();
        assert!(matches!(err, AgentError::DecisionParse { .. }));
    }

    #[test]
    fn test_missing_action_input_is_error() {
        let err = parse("Thought: hmm\nAction: current_time").unwrap_err();
        match err {
            AgentError::DecisionParse { reason, raw } => {
                assert!(reason.contains("Action Input"));
                assert_eq!(raw, "Thought: hmm\nAction: current_time");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_free_text_is_error() {
        assert!(matches!(
            parse("I am not sure what to do."),
            Err(AgentError::DecisionParse { .. })
        ));
    }
}
