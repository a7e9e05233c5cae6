//! Name-to-tool dispatch table.

use std::sync::Arc;

use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::builtin::{BuiltinTool, FetchPageTool, SearchTool};
use super::tool::{Tool, ToolExecutionContext};
use super::validation::validate_arguments;
use crate::error::{Result, ScoutError};
use crate::fetch::PageFetcher;
use crate::provider::ToolDefinition;
use crate::search::SearchClient;
use crate::types::{AgentToolCall, AgentToolResult};

/// Ordered table of tools the model may call.
///
/// Registration order is the order definitions are sent to the provider.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with both built-in tools. `model` picks the page tokenizer.
    pub fn builtin(
        fetcher: Arc<PageFetcher>,
        search: Arc<SearchClient>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let model = model.into();
        let mut registry = Self::new();
        for tool in BuiltinTool::ALL {
            let handler: Arc<dyn Tool> = match tool {
                BuiltinTool::SearchDdg => Arc::new(SearchTool::new(search.clone())),
                BuiltinTool::FetchPage => Arc::new(FetchPageTool::new(fetcher.clone(), model.clone())),
            };
            registry.register(handler)?;
        }
        Ok(registry)
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.get(tool.name()).is_some() {
            return Err(ScoutError::InvalidArgument(format!(
                "tool '{}' is already registered",
                tool.name()
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions in the shape providers expect.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect()
    }

    /// Run one tool call. Never fails: problems become an error observation.
    pub async fn execute(&self, call: &AgentToolCall) -> AgentToolResult {
        match self.try_execute(call).await {
            Ok(result) => AgentToolResult {
                tool_call_id: call.id.clone(),
                result,
                is_error: false,
            },
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool call failed");
                AgentToolResult {
                    tool_call_id: call.id.clone(),
                    result: serde_json::json!({
                        "error": format!("tool {} failed: {}", call.name, failure_reason(&err)),
                    }),
                    is_error: true,
                }
            }
        }
    }

    async fn try_execute(&self, call: &AgentToolCall) -> Result<serde_json::Value> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ScoutError::tool(&call.name, "unknown tool"))?;
        let arguments = normalize_arguments(&call.arguments)?;
        validate_arguments(&arguments, &tool.parameters().schema)?;

        debug!(tool = %call.name, id = %call.id, "executing tool");
        let ctx = ToolExecutionContext {
            tool_call_id: call.id.clone(),
        };
        tool.execute(&ToolArguments::new(arguments), &ctx).await
    }
}

/// Providers may hand over arguments as a JSON string; empty means no arguments.
fn normalize_arguments(raw: &serde_json::Value) -> Result<serde_json::Value> {
    match raw {
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(serde_json::json!({})),
        serde_json::Value::String(s) => serde_json::from_str(s.trim()).map_err(|e| {
            ScoutError::InvalidArgument(format!("arguments are not valid JSON: {e}"))
        }),
        serde_json::Value::Null => Ok(serde_json::json!({})),
        other => Ok(other.clone()),
    }
}

fn failure_reason(err: &ScoutError) -> String {
    match err {
        ScoutError::ToolExecution { message, .. } => message.clone(),
        ScoutError::InvalidArgument(msg) => format!("invalid arguments: {msg}"),
        other => other.to_string(),
    }
}
