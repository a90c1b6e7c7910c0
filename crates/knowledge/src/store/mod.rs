//! Semantic store interface.
//!
//! Retrieval tools only see this trait. `MemoryStore` is the in-process
//! implementation; a hosted vector database plugs in behind the same seam.

pub mod memory;

pub use memory::MemoryStore;

use crate::models::{ContentFragment, Course};
use lectern_core::AppResult;

/// Metadata filter for content search.
///
/// A lesson number without a course scopes the search to that lesson
/// number across every course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Canonical (already resolved) course title
    pub course_title: Option<String>,
    pub lesson_number: Option<u32>,
}

impl SearchFilter {
    pub fn new(course_title: Option<String>, lesson_number: Option<u32>) -> Self {
        Self {
            course_title,
            lesson_number,
        }
    }

    pub fn matches(&self, fragment: &ContentFragment) -> bool {
        let course_ok = self
            .course_title
            .as_ref()
            .map_or(true, |title| &fragment.course_title == title);
        let lesson_ok = self
            .lesson_number
            .map_or(true, |n| fragment.lesson_number == Some(n));
        course_ok && lesson_ok
    }
}

/// A fragment with its distance to the query (lower is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub fragment: ContentFragment,
    pub distance: f32,
}

#[async_trait::async_trait]
pub trait SemanticStore: Send + Sync {
    /// Top `k` fragments matching `filter`, ordered by ascending distance.
    async fn search_content(
        &self,
        query: &str,
        filter: &SearchFilter,
        k: usize,
    ) -> AppResult<Vec<SearchHit>>;

    /// Canonical title closest to `fuzzy_name`, if any is close enough.
    async fn resolve_course_title(&self, fuzzy_name: &str) -> AppResult<Option<String>>;

    /// Catalog entry for an exact, canonical title.
    async fn get_course(&self, title: &str) -> AppResult<Option<Course>>;

    /// Every course in the catalog, in insertion order.
    async fn list_courses(&self) -> AppResult<Vec<Course>>;

    async fn add_course(&self, course: Course) -> AppResult<()>;

    async fn add_fragments(&self, fragments: Vec<ContentFragment>) -> AppResult<()>;

    /// Remove every course and fragment.
    async fn clear(&self) -> AppResult<()>;
}
