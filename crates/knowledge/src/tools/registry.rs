//! Tool registry and dispatch.

use super::{Tool, ToolOutput};
use lectern_core::{AppError, AppResult};
use lectern_llm::ToolSchema;

/// Tools available for one query, keyed by their advertised name.
///
/// Registration order is preserved for definitions and citation collection.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) -> AppResult<()> {
        let name = tool.definition().name;
        if self.has_tool(&name) {
            return Err(AppError::Config(format!(
                "Tool '{}' is already registered",
                name
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.definition().name == name)
    }

    pub fn definitions(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the named tool. Unknown names produce a failed output, not an error.
    pub async fn dispatch(&mut self, name: &str, args: &serde_json::Value) -> ToolOutput {
        let Some(tool) = self
            .tools
            .iter_mut()
            .find(|t| t.definition().name == name)
        else {
            tracing::warn!(tool = name, "Model requested an unknown tool");
            return ToolOutput::failed(format!("Tool '{}' not found", name));
        };

        let output = tool.execute(args).await;
        tracing::debug!(tool = name, status = ?output.status, "Tool executed");
        output
    }

    /// Citations recorded since the last collection, in registration order.
    /// Each tool's record is cleared.
    pub fn collect_citations(&mut self) -> Vec<String> {
        let mut sources = Vec::new();
        for tool in &mut self.tools {
            sources.extend(tool.take_sources());
        }
        sources
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
