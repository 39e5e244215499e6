//! Tool System
//!
//! Tools are registered once at startup; the registry is then frozen behind
//! an `Arc` and only read by the act executor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Declared input shape of a tool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    /// One positional value (or none)
    Scalar,
    /// Named keyword arguments
    Structured,
}

/// Arguments handed to a tool, already adapted to its declared shape
#[derive(Clone, Debug, PartialEq)]
pub enum ToolArgs {
    Positional(serde_json::Value),
    Keyword(serde_json::Map<String, serde_json::Value>),
}

impl ToolArgs {
    /// Positional value as a string, if it is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Positional(v) => v.as_str(),
            Self::Keyword(_) => None,
        }
    }

    /// Keyword argument lookup
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        match self {
            Self::Keyword(map) => map.get(key),
            Self::Positional(_) => None,
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
        }
    }
}

/// Tool definition schema (rendered into the prompt)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// How the tool expects its input
    pub input_shape: InputShape,

    /// Parameter definitions
    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema
    fn schema(&self) -> ToolSchema;

    /// Run the tool and return the observation text
    async fn invoke(&self, args: ToolArgs) -> Result<String>;
}

/// A tool together with the schema captured at registration
#[derive(Clone)]
pub struct RegisteredTool {
    schema: ToolSchema,
    tool: Arc<dyn Tool>,
}

impl RegisteredTool {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub const fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    /// Bind a proposed input to this tool's declared shape
    pub fn adapt(&self, input: &crate::state::ToolInput) -> Result<ToolArgs> {
        use crate::state::ToolInput;

        let args = match (self.schema.input_shape, input) {
            (InputShape::Structured, ToolInput::Structured(map)) => ToolArgs::Keyword(map.clone()),
            (InputShape::Structured, ToolInput::Scalar(serde_json::Value::Null)) => {
                ToolArgs::Keyword(serde_json::Map::new())
            }
            (InputShape::Structured, ToolInput::Scalar(value)) => {
                match self.schema.parameters.as_slice() {
                    [only] => {
                        let mut map = serde_json::Map::new();
                        map.insert(only.name.clone(), value.clone());
                        ToolArgs::Keyword(map)
                    }
                    _ => {
                        return Err(AgentError::ToolValidation(format!(
                            "{} expects named arguments, got {value}",
                            self.schema.name
                        )));
                    }
                }
            }
            (InputShape::Scalar, ToolInput::Scalar(value)) => ToolArgs::Positional(value.clone()),
            (InputShape::Scalar, ToolInput::Structured(map)) => {
                let mut values = map.values();
                match (values.next(), values.next()) {
                    (Some(only), None) => ToolArgs::Positional(only.clone()),
                    _ => ToolArgs::Positional(serde_json::Value::Object(map.clone())),
                }
            }
        };

        self.validate(&args)?;
        Ok(args)
    }

    fn validate(&self, args: &ToolArgs) -> Result<()> {
        if let ToolArgs::Keyword(map) = args {
            for param in &self.schema.parameters {
                if param.required && !map.contains_key(&param.name) {
                    return Err(AgentError::ToolValidation(format!(
                        "Missing required parameter: {}",
                        param.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub async fn invoke(&self, args: ToolArgs) -> Result<String> {
        self.tool.invoke(args).await
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Registry for available tools
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let schema = tool.schema();
        if self.tools.contains_key(&schema.name) {
            return Err(AgentError::DuplicateTool(schema.name));
        }
        tracing::debug!(tool = %schema.name, shape = ?schema.input_shape, "Registered tool");
        self.tools
            .insert(schema.name.clone(), RegisteredTool { schema, tool });
        Ok(())
    }

    /// Resolve a tool by name
    pub fn resolve(&self, name: &str) -> Result<&RegisteredTool> {
        self.tools
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))
    }

    /// Get all tool schemas, ordered by name
    pub fn schemas(&self) -> Vec<&ToolSchema> {
        self.tools.values().map(RegisteredTool::schema).collect()
    }

    /// Get tool names, ordered
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// One line per tool, as listed in the ReAct prompt
    pub fn generate_prompt_section(&self) -> String {
        let mut section = String::new();

        for schema in self.schemas() {
            section.push_str(&format!("{}: {}", schema.name, schema.description));
            match schema.input_shape {
                InputShape::Scalar => match schema.parameters.first() {
                    Some(param) => section.push_str(&format!(
                        " Input: {} ({}).",
                        param.description, param.param_type
                    )),
                    None => section.push_str(" Input: None."),
                },
                InputShape::Structured => {
                    let args: Vec<String> = schema
                        .parameters
                        .iter()
                        .map(|p| {
                            let required = if p.required { ", required" } else { "" };
                            format!("\"{}\" ({}{}): {}", p.name, p.param_type, required, p.description)
                        })
                        .collect();
                    section.push_str(&format!(" Input: a JSON object with {}.", args.join("; ")));
                }
            }
            section.push('\n');
        }

        section.trim_end().to_string()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

// ============================================================================
// Built-in Tools
// ============================================================================

/// Current local time, formatted `YYYY-MM-DD HH:MM:SS`
pub struct CurrentTimeTool {
    clock: fn() -> chrono::NaiveDateTime,
}

impl Default for CurrentTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrentTimeTool {
    pub const FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    pub fn new() -> Self {
        Self {
            clock: || chrono::Local::now().naive_local(),
        }
    }

    /// Use a custom clock (tests, replays)
    pub const fn with_clock(clock: fn() -> chrono::NaiveDateTime) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "current_time".into(),
            description: "Get the current time.".into(),
            input_shape: InputShape::Scalar,
            parameters: Vec::new(),
        }
    }

    async fn invoke(&self, _args: ToolArgs) -> Result<String> {
        Ok((self.clock)().format(Self::FORMAT).to_string())
    }
}
