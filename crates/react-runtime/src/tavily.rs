//! Tavily Web Search Tool
//!
//! Takes a query string and returns a plain-text summary of the top results.

use std::time::Duration;

use async_trait::async_trait;
use react_core::{
    AgentError, Result,
    tool::{InputShape, ParameterSchema, Tool, ToolArgs, ToolSchema},
};
use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "https://api.tavily.com/search";

/// Tavily client configuration
#[derive(Clone, Debug)]
pub struct TavilyConfig {
    pub api_key: String,
    pub endpoint: String,
    pub max_results: u8,
    pub timeout_secs: u64,
}

impl TavilyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            max_results: 5,
            timeout_secs: 20,
        }
    }

    /// Read `TAVILY_API_KEY` (required) and `TAVILY_MAX_RESULTS`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .map_err(|_| AgentError::Config("TAVILY_API_KEY is not set".into()))?;
        let mut config = Self::new(api_key);
        if let Some(max) = std::env::var("TAVILY_MAX_RESULTS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_results = max;
        }
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u8,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

/// Web search backed by the Tavily API
pub struct TavilySearchTool {
    client: reqwest::Client,
    config: TavilyConfig,
}

impl TavilySearchTool {
    pub fn new(config: TavilyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });
        Self { client, config }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(TavilyConfig::from_env()?))
    }

    async fn search(&self, query: &str) -> Result<SearchResponse> {
        let request = SearchRequest {
            api_key: &self.config.api_key,
            query,
            max_results: self.config.max_results,
            include_answer: true,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout(Duration::from_secs(self.config.timeout_secs))
                } else {
                    AgentError::ToolExecution(format!("search request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentError::RateLimited("Tavily rate limit reached".into()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ToolExecution(format!(
                "Tavily returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::ToolExecution(format!("invalid search response: {e}")))
    }
}

/// Render a response as the observation text
fn summarize(query: &str, response: &SearchResponse) -> String {
    if response.results.is_empty() && response.answer.is_none() {
        return format!("No results found for '{query}'.");
    }

    let mut output = String::new();
    if let Some(answer) = response.answer.as_deref().filter(|a| !a.trim().is_empty()) {
        output.push_str(&format!("Summary: {}\n\n", answer.trim()));
    }
    for (i, hit) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} ({})\n   {}\n",
            i + 1,
            hit.title.trim(),
            hit.url,
            hit.content.trim()
        ));
    }
    output.trim_end().to_string()
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "tavily_search".into(),
            description: "Search the web for current information and return a summary of the top results.".into(),
            input_shape: InputShape::Scalar,
            parameters: vec![ParameterSchema::required(
                "query",
                "string",
                "the search query",
            )],
        }
    }

    async fn invoke(&self, args: ToolArgs) -> Result<String> {
        let query = match &args {
            ToolArgs::Positional(serde_json::Value::String(q)) => q.trim().to_string(),
            ToolArgs::Positional(serde_json::Value::Null) => String::new(),
            ToolArgs::Positional(other) => other.to_string(),
            ToolArgs::Keyword(map) => map
                .get("query")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .trim()
                .to_string(),
        };

        if query.is_empty() {
            return Err(AgentError::ToolValidation("search query is empty".into()));
        }

        tracing::debug!(query = %query, "Searching Tavily");
        let response = self.search(&query).await?;
        Ok(summarize(&query, &response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool() -> TavilySearchTool {
        TavilySearchTool::new(TavilyConfig::new("test-key"))
    }

    #[test]
    fn test_summarize_results() {
        let response: SearchResponse = serde_json::from_value(json!({
            "answer": "Rust 1.85 shipped the 2024 edition.",
            "results": [
                {"title": "Announcing Rust 1.85", "url": "https://blog.rust-lang.org", "content": "Edition 2024 is stable."},
                {"title": "Release notes", "url": "https://doc.rust-lang.org", "content": "Details."}
            ]
        }))
        .unwrap();

        let text = summarize("rust 2024", &response);
        assert!(text.starts_with("Summary: Rust 1.85 shipped the 2024 edition."));
        assert!(text.contains("1. Announcing Rust 1.85 (https://blog.rust-lang.org)"));
        assert!(text.contains("2. Release notes"));
    }

    #[test]
    fn test_summarize_empty() {
        let response = SearchResponse {
            answer: None,
            results: Vec::new(),
        };
        assert_eq!(summarize("zzz", &response), "No results found for 'zzz'.");
    }

    #[test]
    fn test_schema_is_scalar() {
        let schema = tool().schema();
        assert_eq!(schema.name, "tavily_search");
        assert_eq!(schema.input_shape, InputShape::Scalar);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let err = tool()
            .invoke(ToolArgs::Positional(json!("   ")))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));
    }
}
