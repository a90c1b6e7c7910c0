//! Course outline tool.

use super::{normalize_course_name, parse_args, Tool, ToolOutput};
use crate::models::Course;
use crate::store::SemanticStore;
use lectern_llm::ToolSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub const OUTLINE_TOOL_NAME: &str = "get_course_outline";

#[derive(Debug, Deserialize)]
struct OutlineArgs {
    #[serde(default)]
    course_name: Option<String>,
}

/// Returns a course's title, link, instructor and lesson list.
///
/// Outlines describe the catalog, not retrieved content, so no citations
/// are recorded.
pub struct CourseOutlineTool {
    store: Arc<dyn SemanticStore>,
}

impl CourseOutlineTool {
    pub fn new(store: Arc<dyn SemanticStore>) -> Self {
        Self { store }
    }

    pub async fn outline(&self, course_name: &str) -> ToolOutput {
        let title = match self.store.resolve_course_title(course_name).await {
            Ok(Some(title)) => title,
            Ok(None) => return ToolOutput::course_not_found(course_name),
            Err(e) => return ToolOutput::failed(format!("Outline error: {}", e)),
        };

        match self.store.get_course(&title).await {
            Ok(Some(course)) => ToolOutput::found(render_outline(&course)),
            Ok(None) => ToolOutput::course_not_found(course_name),
            Err(e) => ToolOutput::failed(format!("Outline error: {}", e)),
        }
    }
}

/// Plain-text outline with lessons in ascending order.
pub fn render_outline(course: &Course) -> String {
    let mut lines = vec![format!("Course: {}", course.title)];
    if let Some(instructor) = &course.instructor {
        lines.push(format!("Instructor: {}", instructor));
    }
    if let Some(link) = &course.course_link {
        lines.push(format!("Link: {}", link));
    }
    lines.push(format!("Total Lessons: {}", course.lessons.len()));

    if !course.lessons.is_empty() {
        lines.push(String::new());
        for lesson in course.ordered_lessons() {
            lines.push(format!("Lesson {}: {}", lesson.lesson_number, lesson.title));
        }
    }

    lines.join("\n")
}

#[async_trait::async_trait]
impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolSchema {
        ToolSchema {
            name: OUTLINE_TOOL_NAME.to_string(),
            description: "Get complete course outline including title, link, and all lessons"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    }
                },
                "required": ["course_name"]
            }),
        }
    }

    async fn execute(&mut self, args: &serde_json::Value) -> ToolOutput {
        let args: OutlineArgs = match parse_args(OUTLINE_TOOL_NAME, args) {
            Ok(args) => args,
            Err(output) => return output,
        };

        match normalize_course_name(args.course_name) {
            Some(name) => self.outline(&name).await,
            None => ToolOutput::failed(format!(
                "Invalid arguments for tool '{}': course_name is required",
                OUTLINE_TOOL_NAME
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::sample_store;
    use crate::tools::ToolStatus;

    #[tokio::test]
    async fn test_outline_by_partial_name() {
        let mut tool = CourseOutlineTool::new(sample_store().await);
        let output = tool.execute(&json!({"course_name": "MCP"})).await;

        assert!(output.is_found());
        assert!(output.content.starts_with("Course: Introduction to MCP\n"));
        assert!(output.content.contains("Instructor: John Doe"));
        assert!(output.content.contains("Link: https://example.com/mcp-course"));
        assert!(output.content.contains("Total Lessons: 3"));
        assert!(output.content.contains("Lesson 0: Getting Started"));
        assert!(output.content.ends_with("Lesson 2: Advanced Topics"));
        assert!(tool.take_sources().is_empty());
    }

    #[tokio::test]
    async fn test_outline_unknown_course() {
        let mut tool = CourseOutlineTool::new(sample_store().await);
        let output = tool
            .execute(&json!({"course_name": "Nonexistent Course XYZ"}))
            .await;

        assert_eq!(output.status, ToolStatus::CourseNotFound);
        assert!(output.content.contains("No course found"));
    }

    #[tokio::test]
    async fn test_outline_requires_course_name() {
        let mut tool = CourseOutlineTool::new(sample_store().await);
        let output = tool.execute(&json!({"course_name": "  "})).await;
        assert_eq!(output.status, ToolStatus::Failed);
    }

    #[test]
    fn test_render_orders_lessons() {
        let mut course = Course::new("Ordering");
        for n in [2, 0] {
            course.lessons.push(crate::models::Lesson {
                lesson_number: n,
                title: format!("Part {}", n),
                lesson_link: None,
            });
        }

        assert_eq!(
            render_outline(&course),
            "Course: Ordering\nTotal Lessons: 2\n\nLesson 0: Part 0\nLesson 2: Part 2"
        );
    }

    #[test]
    fn test_render_without_lessons() {
        assert_eq!(
            render_outline(&Course::new("Empty")),
            "Course: Empty\nTotal Lessons: 0"
        );
    }
}
