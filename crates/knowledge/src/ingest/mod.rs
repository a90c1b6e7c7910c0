//! Course document ingestion: parse, chunk and load into a semantic store.

pub mod chunker;
pub mod parser;

pub use chunker::chunk_sections;
pub use parser::{is_course_document, parse_course_document, parse_course_file, ParsedCourse};

use crate::models::Course;
use crate::store::SemanticStore;
use lectern_core::{AppError, AppResult, RagSettings};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Outcome of a folder load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub courses_added: usize,
    pub fragments_added: usize,
    /// Courses skipped because their title was already in the store
    pub courses_skipped: usize,
    /// Files that could not be read or parsed
    pub files_failed: usize,
}

/// Parse and chunk one course document, then store it.
///
/// Returns `None` when a course with the same title already exists.
pub async fn add_course_document(
    store: &dyn SemanticStore,
    path: &Path,
    settings: &RagSettings,
) -> AppResult<Option<(Course, usize)>> {
    let parsed = parse_course_file(path)?;

    if store.get_course(&parsed.course.title).await?.is_some() {
        return Ok(None);
    }

    let fragments = chunk_sections(
        &parsed.course.title,
        &parsed.sections,
        settings.chunk_size,
        settings.chunk_overlap,
    )?;
    let count = fragments.len();

    store.add_course(parsed.course.clone()).await?;
    store.add_fragments(fragments).await?;

    Ok(Some((parsed.course, count)))
}

/// Load every course document under `folder`.
///
/// Courses whose title is already present are skipped. Unreadable or
/// malformed files are logged and counted, not fatal. With `clear_existing`
/// the store is emptied first.
pub async fn load_course_folder(
    store: &dyn SemanticStore,
    folder: &Path,
    settings: &RagSettings,
    clear_existing: bool,
) -> AppResult<IngestStats> {
    if !folder.is_dir() {
        return Err(AppError::Knowledge(format!(
            "Course folder {:?} does not exist",
            folder
        )));
    }

    if clear_existing {
        tracing::info!("Clearing existing course data");
        store.clear().await?;
    }

    let mut known: HashSet<String> = store
        .list_courses()
        .await?
        .into_iter()
        .map(|c| c.title)
        .collect();

    let mut stats = IngestStats::default();

    for entry in WalkDir::new(folder)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_course_document(path) {
            continue;
        }

        let parsed = match parse_course_file(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                stats.files_failed += 1;
                continue;
            }
        };

        if known.contains(&parsed.course.title) {
            tracing::debug!("Course already loaded: {}", parsed.course.title);
            stats.courses_skipped += 1;
            continue;
        }

        let fragments = chunk_sections(
            &parsed.course.title,
            &parsed.sections,
            settings.chunk_size,
            settings.chunk_overlap,
        )?;
        let fragment_count = fragments.len();
        let title = parsed.course.title.clone();

        store.add_course(parsed.course).await?;
        store.add_fragments(fragments).await?;

        tracing::info!("Loaded course '{}' ({} fragments)", title, fragment_count);
        known.insert(title);
        stats.courses_added += 1;
        stats.fragments_added += fragment_count;
    }

    tracing::info!(
        "Course folder loaded: {} added, {} skipped, {} failed, {} fragments",
        stats.courses_added,
        stats.courses_skipped,
        stats.files_failed,
        stats.fragments_added
    );

    Ok(stats)
}
