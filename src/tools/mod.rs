//! Tool definitions and registry for the MCP servers.
//!
//! A registry is generic over the context its tools share: the Notion server
//! hands tools a [`notion::NotionContext`], the browser server a
//! [`browser::BrowserContext`].

pub mod browser;
pub mod notion;

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::protocol::{ToolCallResult, ToolDefinition};

/// Tool trait for implementing MCP tools.
#[async_trait::async_trait]
pub trait Tool<C>: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value, context: &C) -> Result<ToolCallResult>;
}

/// Registry of available tools.
pub struct ToolRegistry<C> {
    tools: HashMap<String, Arc<dyn Tool<C>>>,
    context: Arc<C>,
}

impl<C: Send + Sync> ToolRegistry<C> {
    /// Create an empty registry around `context`.
    pub fn new(context: C) -> Self {
        Self {
            tools: HashMap::new(),
            context: Arc::new(context),
        }
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool<C>>) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    /// Shared tool context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Get tool definitions, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, arguments: serde_json::Value) -> Result<ToolCallResult> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        tool.execute(arguments, &self.context).await
    }

    /// Execute a tool and fold any failure into the result envelope.
    ///
    /// Unknown tools answer with plain `Unknown tool: <name>` text; every other
    /// failure becomes `Error: <message>` with `isError` set.
    pub async fn call(&self, name: &str, arguments: serde_json::Value) -> ToolCallResult {
        match self.execute(name, arguments).await {
            Ok(result) => result,
            Err(e @ Error::ToolNotFound(_)) => {
                tracing::warn!(tool = name, "unknown tool");
                ToolCallResult::text(e.to_string())
            }
            Err(e) => {
                tracing::error!(tool = name, error = %e, "tool failed");
                ToolCallResult::failure(e)
            }
        }
    }
}

/// Deserialize tool arguments. A missing argument object counts as empty.
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: serde_json::Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    struct EchoTool;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    #[async_trait::async_trait]
    impl Tool<()> for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "echo".into(),
                description: "Echo text back".into(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                }),
            }
        }

        async fn execute(&self, arguments: serde_json::Value, _context: &()) -> Result<ToolCallResult> {
            let args: EchoArgs = parse_args(arguments)?;
            Ok(ToolCallResult::text(args.text))
        }
    }

    fn registry() -> ToolRegistry<()> {
        let mut registry = ToolRegistry::new(());
        registry.register(Arc::new(EchoTool));
        registry
    }

    #[tokio::test]
    async fn test_call_success() {
        let result = registry().call("echo", json!({"text": "hi"})).await;
        assert!(!result.is_error);
        assert_eq!(result.first_text(), Some("hi"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_plain_text() {
        let result = registry().call("nope", json!({})).await;
        assert!(!result.is_error);
        assert_eq!(result.first_text(), Some("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn test_bad_arguments_become_error_text() {
        let result = registry().call("echo", serde_json::Value::Null).await;
        assert!(result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.starts_with("Error: invalid parameters:"), "{text}");
    }

    #[test]
    fn test_list_tools_sorted() {
        let names: Vec<_> = registry().list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["echo"]);
    }
}
