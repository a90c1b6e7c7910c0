//! Split lesson text into overlapping content fragments.

use super::parser::LessonText;
use crate::models::ContentFragment;
use lectern_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Chunk every section of a course into fragments.
///
/// Fragment indices run across the whole course. The first fragment of each
/// numbered lesson is prefixed with `Lesson <n> content: ` so the lesson
/// number is searchable text as well as metadata.
pub fn chunk_sections(
    course_title: &str,
    sections: &[LessonText],
    chunk_size: usize,
    overlap: usize,
) -> AppResult<Vec<ContentFragment>> {
    if chunk_size == 0 {
        return Err(AppError::Config("chunk size must be positive".to_string()));
    }

    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| AppError::Config(format!("Invalid chunk settings: {}", e)))?;
    let splitter = TextSplitter::new(config);

    let mut fragments = Vec::new();

    for section in sections {
        for (position, chunk) in splitter
            .chunks(&section.text)
            .filter(|c| !c.trim().is_empty())
            .enumerate()
        {
            let text = match section.lesson_number {
                Some(n) if position == 0 => format!("Lesson {} content: {}", n, chunk.trim()),
                _ => chunk.trim().to_string(),
            };

            fragments.push(ContentFragment {
                text,
                course_title: course_title.to_string(),
                lesson_number: section.lesson_number,
                chunk_index: fragments.len(),
            });
        }
    }

    tracing::debug!(
        "Chunked '{}' into {} fragments (size: {}, overlap: {})",
        course_title,
        fragments.len(),
        chunk_size,
        overlap
    );

    Ok(fragments)
}
