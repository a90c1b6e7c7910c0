//! Query facade tying the store, tools, generator and sessions together.

use super::generator::{create_generator, GenerationSettings, ResponseGenerator};
use super::types::{CourseAnalytics, QueryResponse};
use crate::embeddings::create_provider;
use crate::ingest::{self, IngestStats};
use crate::models::Course;
use crate::session::ConversationBuffer;
use crate::store::{MemoryStore, SemanticStore};
use crate::tools::{CourseOutlineTool, CourseSearchTool, ToolOutput, ToolRegistry};
use lectern_core::{AppConfig, AppResult, RagSettings};
use lectern_llm::LlmClient;
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;

/// Course question answering over a semantic store.
///
/// Every query gets its own tool registry, so citations never leak between
/// concurrent turns. Conversation history is the only shared state.
pub struct RagSystem {
    store: Arc<dyn SemanticStore>,
    generator: Arc<dyn ResponseGenerator>,
    sessions: ConversationBuffer,
    settings: RagSettings,
}

impl RagSystem {
    pub fn new(
        store: Arc<dyn SemanticStore>,
        generator: Arc<dyn ResponseGenerator>,
        settings: RagSettings,
    ) -> Self {
        Self {
            store,
            generator,
            sessions: ConversationBuffer::new(settings.max_history),
            settings,
        }
    }

    /// Build a system with an in-memory store for `config`, answering through `client`.
    pub fn from_config(config: &AppConfig, client: Arc<dyn LlmClient>) -> AppResult<Self> {
        let ollama = config.get_provider_config("ollama");
        let embedder = create_provider(&config.rag, ollama.as_ref())?;
        tracing::info!(
            provider = embedder.provider_name(),
            model = embedder.model_name(),
            "Using embedding provider"
        );

        let store: Arc<dyn SemanticStore> = Arc::new(MemoryStore::new(
            embedder,
            config.rag.course_match_threshold,
        ));

        let generator = create_generator(
            client,
            GenerationSettings::new(config.model.clone(), config.rag.max_tokens),
            Some(&config.workspace),
        )?;

        Ok(Self::new(store, generator, config.rag.clone()))
    }

    pub fn store(&self) -> &Arc<dyn SemanticStore> {
        &self.store
    }

    pub fn create_session(&self) -> String {
        self.sessions.create_session()
    }

    fn build_registry(&self) -> AppResult<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(CourseSearchTool::new(
            self.store.clone(),
            self.settings.max_results,
        )))?;
        registry.register(Box::new(CourseOutlineTool::new(self.store.clone())))?;
        Ok(registry)
    }

    /// Answer one question, creating a session when none is given.
    ///
    /// Generation failures come back as answer text; only tool setup can fail.
    pub async fn query(&self, question: &str, session_id: Option<&str>) -> AppResult<QueryResponse> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => self.sessions.create_session(),
        };

        let span = tracing::info_span!("query", session = %session_id);
        self.answer(question, session_id).instrument(span).await
    }

    async fn answer(&self, question: &str, session_id: String) -> AppResult<QueryResponse> {
        let mut registry = self.build_registry()?;
        let tools = registry.definitions();
        let history = self.sessions.render(&session_id);

        let answer = self
            .generator
            .respond(question, history.as_deref(), &tools, &mut registry)
            .await;
        let sources = registry.collect_citations();

        tracing::info!(sources = sources.len(), "Answered query");
        self.sessions.add_exchange(&session_id, question, &answer);

        Ok(QueryResponse {
            answer,
            sources,
            session_id,
        })
    }

    /// Course count and titles. Reads only.
    pub async fn get_analytics(&self) -> AppResult<CourseAnalytics> {
        let titles: Vec<String> = self
            .store
            .list_courses()
            .await?
            .into_iter()
            .map(|c| c.title)
            .collect();

        Ok(CourseAnalytics {
            total_courses: titles.len(),
            course_titles: titles,
        })
    }

    /// Outline for a fuzzy course name, rendered as the outline tool does.
    pub async fn course_outline(&self, course_name: &str) -> ToolOutput {
        CourseOutlineTool::new(self.store.clone())
            .outline(course_name)
            .await
    }

    pub async fn add_course_document(&self, path: &Path) -> AppResult<Option<(Course, usize)>> {
        ingest::add_course_document(self.store.as_ref(), path, &self.settings).await
    }

    pub async fn add_course_folder(&self, folder: &Path, clear_existing: bool) -> AppResult<IngestStats> {
        ingest::load_course_folder(self.store.as_ref(), folder, &self.settings, clear_existing).await
    }
}
