//! Query classification and search-parameter extraction for backends
//! without native tool calling.
//!
//! Both are best-effort. The search tool tolerates course names that do not
//! resolve, so a mis-extracted name degrades the search instead of failing
//! the turn.

use regex::Regex;
use std::sync::LazyLock;

/// Terms that always trigger retrieval (whole word, any case).
static STRONG_TRIGGERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:course|lesson|tutorial|module|mcp|claude|anthropic)\b")
        .expect("strong trigger regex")
});

const EDUCATIONAL_PATTERNS: &[&str] = &[
    "how to",
    "what is",
    "what are",
    "explain",
    "learn",
    "teach",
    "show me",
    "tell me about",
    "describe",
];

/// Technical keywords, whole word with an optional plural.
static TECH_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:api|programming|code|software|development|python|javascript|database|ml|ai)s?\b",
    )
    .expect("technical keyword regex")
});

static LESSON_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\blesson\s+(\d+)\b",
        r"(?i)\bin\s+lesson\s+(\d+)\b",
        r"(?i)\bof\s+lesson\s+(\d+)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("lesson pattern regex"))
    .collect()
});

static COURSE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["in", "from", "about", "of"]
        .iter()
        .map(|prep| {
            Regex::new(&format!(r"(?i)\b{}\s+(?:the\s+)?([^?]+?)\s+course\b", prep))
                .expect("course pattern regex")
        })
        .collect()
});

/// Trailing copula left over from phrasings like "what the MCP course is".
static TRAILING_COPULA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:is|are|was|were)\s*$").expect("trailing copula regex")
});

/// Lesson phrase captured ahead of the course name, as in
/// "in lesson 2 of the MCP course".
static LEADING_LESSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^lesson\s+\d+\s+(?:of|in|from)\s+(?:the\s+)?").expect("leading lesson regex")
});

/// Known course identifiers, most specific first.
static COURSE_IDENTIFIERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bIntroduction\s+to\s+MCP\b",
        r"(?i)\bMCP\b",
        r"(?i)\bAnthropic\b",
        r"(?i)\bClaude\b",
        r"(?i)\bBuilding\s+with\s+\w+\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("course identifier regex"))
    .collect()
});

/// Parameters pulled out of a raw query for the search tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    pub query: String,
    pub course_name: Option<String>,
    pub lesson_number: Option<u32>,
}

impl SearchParameters {
    /// Tool arguments with absent keys left out entirely.
    pub fn to_args(&self) -> serde_json::Value {
        let mut args = serde_json::Map::new();
        args.insert("query".to_string(), self.query.clone().into());
        if let Some(course) = &self.course_name {
            args.insert("course_name".to_string(), course.clone().into());
        }
        if let Some(lesson) = self.lesson_number {
            args.insert("lesson_number".to_string(), lesson.into());
        }
        serde_json::Value::Object(args)
    }
}

/// Decide whether a query is worth a course search.
pub fn should_search(query: &str) -> bool {
    if STRONG_TRIGGERS.is_match(query) {
        return true;
    }

    let lowered = query.to_lowercase();
    let educational = EDUCATIONAL_PATTERNS.iter().any(|p| lowered.contains(p));
    educational && TECH_KEYWORDS.is_match(query)
}

/// Extract search parameters from a raw query.
pub fn extract_parameters(query: &str) -> SearchParameters {
    SearchParameters {
        query: query.to_string(),
        course_name: extract_course_name(query),
        lesson_number: extract_lesson_number(query),
    }
}

fn extract_lesson_number(query: &str) -> Option<u32> {
    LESSON_PATTERNS
        .iter()
        .find_map(|re| re.captures(query))
        .and_then(|caps| caps[1].parse().ok())
}

fn extract_course_name(query: &str) -> Option<String> {
    let phrased = COURSE_PATTERNS
        .iter()
        .find_map(|re| re.captures(query))
        .map(|caps| {
            let name = TRAILING_COPULA.replace(caps[1].trim(), "");
            LEADING_LESSON.replace(&name, "").trim().to_string()
        })
        .filter(|name| !name.is_empty());

    phrased.or_else(|| {
        COURSE_IDENTIFIERS
            .iter()
            .find_map(|re| re.find(query))
            .map(|m| m.as_str().to_string())
    })
}
