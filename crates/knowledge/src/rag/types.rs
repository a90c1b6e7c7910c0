//! Query facade response types.

use serde::{Deserialize, Serialize};

/// Answer to one query turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Model answer, or a fixed error message when generation failed
    pub answer: String,

    /// Citations of the course content used for this turn only
    pub sources: Vec<String>,

    /// Session the turn was recorded in
    pub session_id: String,
}

/// Catalog summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}
