//! Course document parsing.
//!
//! Expected layout:
//!
//! ```text
//! Course Title: Introduction to MCP
//! Course Link: https://example.com/mcp-course
//! Course Instructor: John Doe
//!
//! Lesson 0: Getting Started
//! Lesson Link: https://example.com/lesson0
//! Lesson body text...
//!
//! Lesson 1: Basic Concepts
//! ...
//! ```
//!
//! Header lines are optional; a document without a title falls back to the
//! file name. Text before the first lesson marker (or a document without any
//! markers) becomes unnumbered course content.

use crate::models::{Course, Lesson};
use lectern_core::{AppError, AppResult};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions accepted by the folder loader.
pub const COURSE_EXTENSIONS: &[&str] = &["txt", "md"];

/// Body text belonging to one lesson (or to the course as a whole).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonText {
    pub lesson_number: Option<u32>,
    pub text: String,
}

/// A parsed course document.
#[derive(Debug, Clone)]
pub struct ParsedCourse {
    pub course: Course,
    pub sections: Vec<LessonText>,
}

/// Matches `Lesson <n>: <title>`.
static LESSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^lesson\s+(\d+)\s*:\s*(.*)$").expect("lesson marker regex")
});

/// Check whether a path looks like a course document.
pub fn is_course_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| COURSE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Read and parse a course document from disk.
pub fn parse_course_file(path: &Path) -> AppResult<ParsedCourse> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled course");

    parse_course_document(&raw, fallback)
}

/// Parse course document text.
pub fn parse_course_document(raw: &str, fallback_title: &str) -> AppResult<ParsedCourse> {
    let mut title: Option<String> = None;
    let mut course_link: Option<String> = None;
    let mut instructor: Option<String> = None;

    let mut lessons: Vec<Lesson> = Vec::new();
    let mut sections: Vec<LessonText> = Vec::new();

    let mut current_number: Option<u32> = None;
    let mut current_body: Vec<&str> = Vec::new();
    let mut awaiting_lesson_link = false;

    for line in raw.lines() {
        let trimmed = line.trim();

        if current_number.is_none() && lessons.is_empty() {
            if let Some(value) = header_value(trimmed, "Course Title:") {
                title = Some(value.to_string());
                continue;
            }
            if let Some(value) = header_value(trimmed, "Course Link:") {
                course_link = Some(value.to_string());
                continue;
            }
            if let Some(value) = header_value(trimmed, "Course Instructor:") {
                instructor = Some(value.to_string());
                continue;
            }
        }

        if let Some(caps) = LESSON_RE.captures(trimmed) {
            flush_section(&mut sections, current_number, &current_body);
            current_body.clear();

            let number: u32 = caps[1].parse().map_err(|_| {
                AppError::Knowledge(format!("Invalid lesson number in line: {}", trimmed))
            })?;
            if lessons.iter().any(|l| l.lesson_number == number) {
                return Err(AppError::Knowledge(format!(
                    "Duplicate lesson number {} in course document",
                    number
                )));
            }

            lessons.push(Lesson {
                lesson_number: number,
                title: caps[2].trim().to_string(),
                lesson_link: None,
            });
            current_number = Some(number);
            awaiting_lesson_link = true;
            continue;
        }

        if awaiting_lesson_link {
            if trimmed.is_empty() {
                continue;
            }
            awaiting_lesson_link = false;
            if let Some(value) = header_value(trimmed, "Lesson Link:") {
                if let Some(lesson) = lessons.last_mut() {
                    lesson.lesson_link = Some(value.to_string());
                }
                continue;
            }
        }

        current_body.push(line);
    }
    flush_section(&mut sections, current_number, &current_body);

    let title = title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    Ok(ParsedCourse {
        course: Course {
            title,
            course_link,
            instructor,
            lessons,
        },
        sections,
    })
}

fn header_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(line[prefix.len()..].trim())
    } else {
        None
    }
}

fn flush_section(sections: &mut Vec<LessonText>, lesson_number: Option<u32>, body: &[&str]) {
    let text = body.join("\n").trim().to_string();
    if !text.is_empty() {
        sections.push(LessonText {
            lesson_number,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Course Title: Introduction to MCP
Course Link: https://example.com/mcp-course
Course Instructor: John Doe

Lesson 0: Getting Started
Lesson Link: https://example.com/lesson0
MCP stands for Model Context Protocol.

Lesson 1: Basic Concepts
MCP servers provide tools and resources.
A tool is a function the model can call.
";

    #[test]
    fn test_parse_headers_and_lessons() {
        let parsed = parse_course_document(DOC, "fallback").unwrap();
        let course = &parsed.course;

        assert_eq!(course.title, "Introduction to MCP");
        assert_eq!(course.instructor.as_deref(), Some("John Doe"));
        assert_eq!(
            course.course_link.as_deref(),
            Some("https://example.com/mcp-course")
        );
        assert_eq!(course.lessons.len(), 2);
        assert_eq!(
            course.lessons[0].lesson_link.as_deref(),
            Some("https://example.com/lesson0")
        );
        assert_eq!(course.lessons[1].title, "Basic Concepts");
        assert_eq!(course.lessons[1].lesson_link, None);

        assert_eq!(parsed.sections.len(), 2);
        assert_eq!(parsed.sections[0].lesson_number, Some(0));
        assert_eq!(parsed.sections[0].text, "MCP stands for Model Context Protocol.");
        assert!(parsed.sections[1].text.contains("A tool is a function"));
    }

    #[test]
    fn test_missing_title_uses_fallback() {
        let parsed = parse_course_document("Just some notes.\nMore notes.", "notes").unwrap();
        assert_eq!(parsed.course.title, "notes");
        assert!(parsed.course.lessons.is_empty());
        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(parsed.sections[0].lesson_number, None);
    }

    #[test]
    fn test_duplicate_lesson_number_rejected() {
        let doc = "Course Title: X\nLesson 1: A\ntext\nLesson 1: B\ntext";
        assert!(parse_course_document(doc, "x").is_err());
    }

    #[test]
    fn test_is_course_document() {
        assert!(is_course_document(Path::new("course1_script.txt")));
        assert!(is_course_document(Path::new("notes.MD")));
        assert!(!is_course_document(Path::new("slides.pdf")));
    }
}
