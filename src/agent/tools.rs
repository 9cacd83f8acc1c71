//! Tool registry and the web search tool.

use super::parser::ToolInvocation;
use crate::error::{PlanetaryError, Result};
use crate::search::SearchProvider;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Name the planning prompt advertises for web search.
pub const WEB_SEARCH_TOOL: &str = "webSearchTool";

/// One documented tool parameter.
#[derive(Debug, Clone)]
pub struct ToolParameter {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// A capability the model can ask the planner to run.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> Vec<ToolParameter>;

    /// Run the tool. Failures are reported as [`PlanetaryError::ToolExecution`].
    async fn invoke(&self, args: &Map<String, Value>) -> Result<String>;
}

/// Tools available to the planner, in registration order.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    timeout: Duration,
}

impl ToolRegistry {
    /// Create an empty registry whose tool calls time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            tools: Vec::new(),
            timeout,
        }
    }

    /// Register a tool. A tool with the same name is replaced.
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Render the tool catalog for the planning prompt.
    pub fn catalog(&self) -> String {
        let mut out = String::new();
        for tool in &self.tools {
            out.push_str(&format!("- Name: {}\n", tool.name()));
            out.push_str(&format!("  Description: {}\n", tool.description()));
            out.push_str("  Parameters:\n");
            for p in tool.parameters() {
                let required = if p.required { " (REQUIRED)" } else { "" };
                out.push_str(&format!(
                    "    - {}: {}{} - {}\n",
                    p.name, p.kind, required, p.description
                ));
            }
        }
        out
    }

    /// Execute a parsed invocation.
    ///
    /// Every failure comes back as a recoverable tool error: `UnknownTool` for an
    /// unregistered name, `ToolExecution` for anything else, including timeouts.
    pub async fn execute(&self, invocation: &ToolInvocation) -> Result<String> {
        let tool = self
            .get(&invocation.tool_name)
            .ok_or_else(|| PlanetaryError::UnknownTool(invocation.tool_name.clone()))?;

        debug!(tool = %invocation.tool_name, call_id = %invocation.call_id, "invoking tool");

        match tokio::time::timeout(self.timeout, tool.invoke(&invocation.arguments)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) if e.is_recoverable_tool_error() => Err(e),
            Ok(Err(e)) => Err(PlanetaryError::tool(tool.name(), e.to_string())),
            Err(_) => Err(PlanetaryError::tool(
                tool.name(),
                format!("timed out after {}s", self.timeout.as_secs_f32()),
            )),
        }
    }
}

/// Web search backed by a [`SearchProvider`].
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Perform a web search using DuckDuckGo."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter {
            name: "query",
            kind: "string",
            required: true,
            description: "The query to search on the web.",
        }]
    }

    async fn invoke(&self, args: &Map<String, Value>) -> Result<String> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| PlanetaryError::tool(WEB_SEARCH_TOOL, "Missing 'query' argument"))?;

        debug!(provider = self.provider.name(), query, "web search");

        self.provider.search(query).await.map_err(|e| match e {
            PlanetaryError::ToolExecution { .. } => e,
            other => PlanetaryError::tool(WEB_SEARCH_TOOL, other.to_string()),
        })
    }
}
