//! Retrieval tools exposed to the language model.
//!
//! A tool never fails with an error: every outcome, including bad
//! arguments and unknown courses, is text the model can read. The status
//! tells callers whether that text is course content.

pub mod outline;
pub mod registry;
pub mod search;

pub use outline::CourseOutlineTool;
pub use registry::ToolRegistry;
pub use search::CourseSearchTool;

use lectern_llm::ToolSchema;
use serde::de::DeserializeOwned;

/// How a tool execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// Content was found and rendered
    Found,
    /// The lookup ran but matched nothing
    Empty,
    /// The course name did not resolve to a known course
    CourseNotFound,
    /// Bad arguments, unknown tool, or a store failure
    Failed,
}

/// Result of a tool execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
    pub status: ToolStatus,
}

impl ToolOutput {
    pub fn found(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            status: ToolStatus::Found,
        }
    }

    pub fn empty(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            status: ToolStatus::Empty,
        }
    }

    pub fn failed(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            status: ToolStatus::Failed,
        }
    }

    pub fn course_not_found(name: &str) -> Self {
        Self {
            content: format!("No course found matching '{}'", name),
            status: ToolStatus::CourseNotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == ToolStatus::Found
    }

    pub fn is_course_not_found(&self) -> bool {
        self.status == ToolStatus::CourseNotFound
    }

    /// Whether the model should see this output as a tool error.
    pub fn is_error(&self) -> bool {
        matches!(self.status, ToolStatus::CourseNotFound | ToolStatus::Failed)
    }
}

#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Schema advertised to the model; `definition().name` is the dispatch key.
    fn definition(&self) -> ToolSchema;

    async fn execute(&mut self, args: &serde_json::Value) -> ToolOutput;

    /// Citations recorded by the last execution, leaving none behind.
    fn take_sources(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Decode tool arguments, turning a mismatch into a failed output.
pub(crate) fn parse_args<T: DeserializeOwned>(
    tool: &str,
    args: &serde_json::Value,
) -> Result<T, ToolOutput> {
    serde_json::from_value(args.clone()).map_err(|e| {
        ToolOutput::failed(format!("Invalid arguments for tool '{}': {}", tool, e))
    })
}

/// Missing, null or blank course names count as absent.
pub(crate) fn normalize_course_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
