//! Prompt Templates
//!
//! The decision engine treats the template as an opaque
//! `render(input, history) -> prompt` function.

use crate::state::Step;
use crate::tool::ToolRegistry;

/// Renders the text sent to the LLM for one reasoning step
pub trait PromptTemplate: Send + Sync {
    fn render(&self, input: &str, history: &[Step]) -> String;
}

/// Standard ReAct instruction template.
///
/// Placeholders: `{tools}`, `{tool_names}`, `{input}`, `{agent_scratchpad}`.
pub const REACT_TEMPLATE: &str = r"Answer the following questions as best you can. You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought:{agent_scratchpad}";

/// ReAct prompt with the tool list captured at construction
#[derive(Clone, Debug)]
pub struct ReactPrompt {
    template: String,
    tools: String,
    tool_names: String,
}

impl ReactPrompt {
    /// Build from the default template and a registry snapshot
    pub fn new(tools: &ToolRegistry) -> Self {
        Self::with_template(REACT_TEMPLATE, tools)
    }

    /// Build from a custom template and a registry snapshot
    pub fn with_template(template: &str, tools: &ToolRegistry) -> Self {
        Self {
            template: template.to_string(),
            tools: tools.generate_prompt_section(),
            tool_names: tools.names().join(", "),
        }
    }
}

impl PromptTemplate for ReactPrompt {
    fn render(&self, input: &str, history: &[Step]) -> String {
        let scratchpad = format_scratchpad(history);
        substitute(
            &self.template,
            &[
                ("{tools}", self.tools.as_str()),
                ("{tool_names}", self.tool_names.as_str()),
                ("{input}", input),
                ("{agent_scratchpad}", scratchpad.as_str()),
            ],
        )
    }
}

/// Fill placeholders in a single left-to-right pass; substituted text is never rescanned
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((pos, key, value)) = vars
        .iter()
        .filter_map(|(key, value)| rest.find(*key).map(|pos| (pos, *key, *value)))
        .min_by_key(|(pos, _, _)| *pos)
    {
        out.push_str(&rest[..pos]);
        out.push_str(value);
        rest = &rest[pos + key.len()..];
    }

    out.push_str(rest);
    out
}

/// Replay past steps the way the model originally wrote them
pub fn format_scratchpad(history: &[Step]) -> String {
    let mut scratchpad = String::new();
    for step in history {
        scratchpad.push_str(&step.action.log);
        scratchpad.push_str("\nObservation: ");
        scratchpad.push_str(&step.observation);
        scratchpad.push_str("\nThought: ");
    }
    scratchpad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PendingAction, ToolInput};
    use crate::tool::CurrentTimeTool;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(CurrentTimeTool::new()).unwrap();
        registry
    }

    #[test]
    fn test_render_without_history() {
        let prompt = ReactPrompt::new(&registry()).render("What time is it?", &[]);

        assert!(prompt.contains("should be one of [current_time]"));
        assert!(prompt.contains("current_time: Get the current time."));
        assert!(prompt.ends_with("Question: What time is it?\nThought:"));
    }

    #[test]
    fn test_render_replays_history_in_order() {
        let history = vec![
            Step {
                action: PendingAction::new("current_time", ToolInput::none())
                    .with_log(" I should check the clock.\nAction: current_time\nAction Input: None"),
                observation: "2024-01-01 12:00:00".into(),
            },
            Step {
                action: PendingAction::new("search", ToolInput::text("news")),
                observation: "nothing".into(),
            },
        ];

        let prompt = ReactPrompt::new(&registry()).render("q", &history);
        let first = prompt.find("Observation: 2024-01-01 12:00:00").unwrap();
        let second = prompt.find("Observation: nothing").unwrap();

        assert!(first < second);
        assert!(prompt.ends_with("Observation: nothing\nThought: "));
    }

    #[test]
    fn test_placeholders_in_input_are_left_alone() {
        let history = vec![Step {
            action: PendingAction::new("current_time", ToolInput::none()),
            observation: "2024-01-01 12:00:00".into(),
        }];

        let prompt =
            ReactPrompt::new(&registry()).render("what does {agent_scratchpad} mean?", &history);

        assert!(prompt.contains("Question: what does {agent_scratchpad} mean?\nThought:"));
        assert_eq!(prompt.matches("Observation: 2024-01-01 12:00:00").count(), 1);
    }

    #[test]
    fn test_scratchpad_empty_for_no_steps() {
        assert_eq!(format_scratchpad(&[]), "");
    }
}
