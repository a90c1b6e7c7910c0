//! Content-search tool.

use super::{normalize_course_name, parse_args, Tool, ToolOutput};
use crate::store::{SearchFilter, SemanticStore};
use lectern_llm::ToolSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub const SEARCH_TOOL_NAME: &str = "search_course_content";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    lesson_number: Option<u32>,
}

/// Semantic search over course content with optional course and lesson scope.
pub struct CourseSearchTool {
    store: Arc<dyn SemanticStore>,
    max_results: usize,
    last_sources: Vec<String>,
}

impl CourseSearchTool {
    pub fn new(store: Arc<dyn SemanticStore>, max_results: usize) -> Self {
        Self {
            store,
            max_results,
            last_sources: Vec::new(),
        }
    }

    /// Run a search with already-decoded arguments.
    pub async fn search(
        &mut self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> ToolOutput {
        self.last_sources.clear();

        let course_title = match course_name {
            Some(name) => match self.store.resolve_course_title(name).await {
                Ok(Some(title)) => Some(title),
                Ok(None) => return ToolOutput::course_not_found(name),
                Err(e) => return ToolOutput::failed(format!("Search error: {}", e)),
            },
            None => None,
        };

        let filter = SearchFilter::new(course_title, lesson_number);
        let hits = match self
            .store
            .search_content(query, &filter, self.max_results)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!("Course search failed: {}", e);
                return ToolOutput::failed(format!("Search error: {}", e));
            }
        };

        if hits.is_empty() {
            let mut message = "No relevant content found".to_string();
            if let Some(title) = &filter.course_title {
                message.push_str(&format!(" in course '{}'", title));
            }
            if let Some(n) = filter.lesson_number {
                message.push_str(&format!(" in lesson {}", n));
            }
            return ToolOutput::empty(message);
        }

        let mut blocks = Vec::with_capacity(hits.len());
        for hit in hits.iter().take(self.max_results) {
            let label = hit.fragment.citation();
            blocks.push(format!("[{}]\n{}", label, hit.fragment.text));
            self.last_sources.push(label);
        }

        tracing::debug!(results = blocks.len(), "Course search produced results");
        ToolOutput::found(blocks.join("\n\n"))
    }
}

#[async_trait::async_trait]
impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolSchema {
        ToolSchema {
            name: SEARCH_TOOL_NAME.to_string(),
            description:
                "Search course materials with smart course name matching and lesson filtering"
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&mut self, args: &serde_json::Value) -> ToolOutput {
        let args: SearchArgs = match parse_args(SEARCH_TOOL_NAME, args) {
            Ok(args) => args,
            Err(output) => {
                self.last_sources.clear();
                return output;
            }
        };

        let course_name = normalize_course_name(args.course_name);
        self.search(&args.query, course_name.as_deref(), args.lesson_number)
            .await
    }

    fn take_sources(&mut self) -> Vec<String> {
        std::mem::take(&mut self.last_sources)
    }
}
