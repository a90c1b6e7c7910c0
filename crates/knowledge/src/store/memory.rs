//! In-memory semantic store.
//!
//! Brute-force cosine search over every stored fragment. Suitable for a
//! course catalog that fits in memory; nothing is persisted.

use super::{SearchFilter, SearchHit, SemanticStore};
use crate::embeddings::{cosine_distance, EmbeddingProvider};
use crate::models::{ContentFragment, Course};
use lectern_core::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug)]
struct CatalogEntry {
    course: Course,
    title_embedding: Vec<f32>,
}

#[derive(Debug)]
struct IndexedFragment {
    fragment: ContentFragment,
    embedding: Vec<f32>,
}

#[derive(Debug, Default)]
struct StoreState {
    catalog: Vec<CatalogEntry>,
    fragments: Vec<IndexedFragment>,
}

pub struct MemoryStore {
    embedder: Arc<dyn EmbeddingProvider>,
    /// Maximum cosine distance accepted by embedding-based course resolution
    course_match_threshold: f32,
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, course_match_threshold: f32) -> Self {
        Self {
            embedder,
            course_match_threshold,
            state: RwLock::new(StoreState::default()),
        }
    }

    #[cfg(test)]
    pub async fn fragment_count(&self) -> usize {
        self.state.read().await.fragments.len()
    }
}

#[async_trait::async_trait]
impl SemanticStore for MemoryStore {
    async fn search_content(
        &self,
        query: &str,
        filter: &SearchFilter,
        k: usize,
    ) -> AppResult<Vec<SearchHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let state = self.state.read().await;

        let mut hits: Vec<SearchHit> = state
            .fragments
            .iter()
            .filter(|indexed| filter.matches(&indexed.fragment))
            .map(|indexed| SearchHit {
                fragment: indexed.fragment.clone(),
                distance: cosine_distance(&query_embedding, &indexed.embedding),
            })
            .collect();

        // Stable: equal distances keep insertion order
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        tracing::debug!(
            course = ?filter.course_title,
            lesson = ?filter.lesson_number,
            hits = hits.len(),
            "Searched course content"
        );

        Ok(hits)
    }

    async fn resolve_course_title(&self, fuzzy_name: &str) -> AppResult<Option<String>> {
        let wanted = fuzzy_name.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(None);
        }

        {
            let state = self.state.read().await;
            if state.catalog.is_empty() {
                return Ok(None);
            }

            if let Some(entry) = state
                .catalog
                .iter()
                .find(|e| e.course.title.to_lowercase() == wanted)
            {
                return Ok(Some(entry.course.title.clone()));
            }

            let containing: Vec<&CatalogEntry> = state
                .catalog
                .iter()
                .filter(|e| e.course.title.to_lowercase().contains(&wanted))
                .collect();
            if let [only] = containing.as_slice() {
                return Ok(Some(only.course.title.clone()));
            }
        }

        let name_embedding = self.embedder.embed(fuzzy_name).await?;
        let state = self.state.read().await;

        let nearest = state
            .catalog
            .iter()
            .map(|e| (e, cosine_distance(&name_embedding, &e.title_embedding)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        match nearest {
            Some((entry, distance)) if distance <= self.course_match_threshold => {
                tracing::debug!(
                    name = fuzzy_name,
                    title = %entry.course.title,
                    distance,
                    "Resolved course by embedding"
                );
                Ok(Some(entry.course.title.clone()))
            }
            _ => {
                tracing::debug!(name = fuzzy_name, "No course close enough");
                Ok(None)
            }
        }
    }

    async fn get_course(&self, title: &str) -> AppResult<Option<Course>> {
        let state = self.state.read().await;
        Ok(state
            .catalog
            .iter()
            .find(|e| e.course.title == title)
            .map(|e| e.course.clone()))
    }

    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        let state = self.state.read().await;
        Ok(state.catalog.iter().map(|e| e.course.clone()).collect())
    }

    async fn add_course(&self, course: Course) -> AppResult<()> {
        let title_embedding = self.embedder.embed(&course.title).await?;
        let mut state = self.state.write().await;

        if state.catalog.iter().any(|e| e.course.title == course.title) {
            return Err(AppError::Knowledge(format!(
                "Course '{}' already exists",
                course.title
            )));
        }

        tracing::info!(title = %course.title, lessons = course.lessons.len(), "Added course");
        state.catalog.push(CatalogEntry {
            course,
            title_embedding,
        });
        Ok(())
    }

    async fn add_fragments(&self, fragments: Vec<ContentFragment>) -> AppResult<()> {
        if fragments.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = fragments.iter().map(|f| f.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != fragments.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} fragments",
                embeddings.len(),
                fragments.len()
            )));
        }

        let mut state = self.state.write().await;
        state.fragments.extend(
            fragments
                .into_iter()
                .zip(embeddings)
                .map(|(fragment, embedding)| IndexedFragment {
                    fragment,
                    embedding,
                }),
        );
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.catalog.clear();
        state.fragments.clear();
        tracing::info!("Cleared semantic store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;

    fn store() -> MemoryStore {
        MemoryStore::new(Arc::new(TrigramProvider::new(384)), 0.65)
    }

    fn fragment(course: &str, lesson: Option<u32>, index: usize, text: &str) -> ContentFragment {
        ContentFragment {
            text: text.to_string(),
            course_title: course.to_string(),
            lesson_number: lesson,
            chunk_index: index,
        }
    }

    #[tokio::test]
    async fn test_resolution_tiers() {
        let store = store();
        store.add_course(Course::new("Introduction to MCP")).await.unwrap();
        store
            .add_course(Course::new("Building with Anthropic Claude"))
            .await
            .unwrap();

        async fn resolve(store: &MemoryStore, name: &str) -> Option<String> {
            store.resolve_course_title(name).await.unwrap()
        }

        assert_eq!(
            resolve(&store, "introduction to mcp").await.as_deref(),
            Some("Introduction to MCP")
        );
        assert_eq!(
            resolve(&store, "MCP").await.as_deref(),
            Some("Introduction to MCP")
        );
        assert_eq!(
            resolve(&store, "Claude").await.as_deref(),
            Some("Building with Anthropic Claude")
        );
        assert_eq!(resolve(&store, "Nonexistent Course XYZ").await, None);
        assert_eq!(resolve(&store, "   ").await, None);
    }

    #[tokio::test]
    async fn test_resolution_on_empty_catalog() {
        assert_eq!(store().resolve_course_title("MCP").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_course_rejected() {
        let store = store();
        store.add_course(Course::new("Introduction to MCP")).await.unwrap();
        let err = store.add_course(Course::new("Introduction to MCP")).await;
        assert!(matches!(err, Err(AppError::Knowledge(_))));
        assert_eq!(store.list_courses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_orders_and_limits() {
        let store = store();
        store
            .add_fragments(vec![
                fragment("A", Some(0), 0, "cooking pasta recipes"),
                fragment("A", Some(1), 1, "MCP servers expose tools"),
                fragment("A", Some(1), 2, "MCP servers expose tools and resources"),
                fragment("B", Some(0), 0, "gardening tips"),
            ])
            .await
            .unwrap();

        let hits = store
            .search_content("MCP servers tools", &SearchFilter::default(), 3)
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(hits[0].fragment.chunk_index, 1);
    }

    #[tokio::test]
    async fn test_search_ties_keep_insertion_order() {
        let store = store();
        store
            .add_fragments(vec![
                fragment("A", Some(0), 0, "same words here"),
                fragment("A", Some(0), 1, "same words here"),
            ])
            .await
            .unwrap();

        let hits = store
            .search_content("same words", &SearchFilter::default(), 5)
            .await
            .unwrap();
        assert_eq!(hits[0].fragment.chunk_index, 0);
        assert_eq!(hits[1].fragment.chunk_index, 1);
    }

    #[tokio::test]
    async fn test_search_applies_filter() {
        let store = store();
        store
            .add_fragments(vec![
                fragment("A", Some(0), 0, "alpha"),
                fragment("A", Some(1), 1, "alpha"),
                fragment("B", Some(1), 0, "alpha"),
            ])
            .await
            .unwrap();

        let lesson_only = store
            .search_content("alpha", &SearchFilter::new(None, Some(1)), 5)
            .await
            .unwrap();
        assert_eq!(lesson_only.len(), 2);

        let scoped = store
            .search_content("alpha", &SearchFilter::new(Some("A".into()), Some(1)), 5)
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].fragment.course_title, "A");

        let none = store
            .search_content("alpha", &SearchFilter::new(Some("C".into()), None), 5)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = store();
        store.add_course(Course::new("A")).await.unwrap();
        store
            .add_fragments(vec![fragment("A", None, 0, "text")])
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert!(store.list_courses().await.unwrap().is_empty());
        assert_eq!(store.fragment_count().await, 0);
    }
}
