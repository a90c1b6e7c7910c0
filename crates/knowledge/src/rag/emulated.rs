//! Generation for backends without native tool calling.
//!
//! The query is classified up front; when it looks course related the
//! search tool runs once with parameters pulled from the query text and the
//! results go into the system prompt. Exactly one model call per turn.

use super::generator::{failure_message, GenerationSettings, ResponseGenerator, TurnPhase};
use super::heuristics::{extract_parameters, should_search, SearchParameters};
use crate::tools::search::SEARCH_TOOL_NAME;
use crate::tools::ToolRegistry;
use lectern_core::AppResult;
use lectern_llm::{ChatMessage, LlmClient, ToolSchema};
use lectern_prompt::{build_prompt, PromptDefinition, SEARCH_EMPTY_VAR, SEARCH_RESULTS_VAR};
use std::collections::HashMap;
use std::sync::Arc;

pub struct EmulatedToolGenerator {
    client: Arc<dyn LlmClient>,
    settings: GenerationSettings,
    prompt: PromptDefinition,
}

impl EmulatedToolGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        settings: GenerationSettings,
        prompt: PromptDefinition,
    ) -> Self {
        Self {
            client,
            settings,
            prompt,
        }
    }

    /// Course content for the prompt: `Some(text)` when found, `None` when
    /// the search ran and came back empty or failed.
    async fn prefetch(&self, query: &str, registry: &mut ToolRegistry) -> Option<String> {
        let params = extract_parameters(query);
        tracing::debug!(
            course = ?params.course_name,
            lesson = ?params.lesson_number,
            "Extracted search parameters"
        );

        let mut output = registry.dispatch(SEARCH_TOOL_NAME, &params.to_args()).await;

        // An extracted name that resolves to nothing widens to an unscoped search
        if output.is_course_not_found() && params.course_name.is_some() {
            tracing::debug!("Extracted course did not resolve, searching without it");
            let widened = SearchParameters {
                course_name: None,
                ..params
            };
            output = registry.dispatch(SEARCH_TOOL_NAME, &widened.to_args()).await;
        }

        if output.is_found() {
            Some(output.content)
        } else {
            tracing::debug!(status = ?output.status, "No course content for prompt");
            None
        }
    }

    async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolSchema],
        registry: &mut ToolRegistry,
    ) -> AppResult<String> {
        let mut variables = HashMap::new();

        let offered = tools.iter().any(|t| t.name == SEARCH_TOOL_NAME)
            && registry.has_tool(SEARCH_TOOL_NAME);
        if offered && should_search(query) {
            match self.prefetch(query, registry).await {
                Some(results) => {
                    variables.insert(SEARCH_RESULTS_VAR.to_string(), results);
                }
                None => {
                    variables.insert(SEARCH_EMPTY_VAR.to_string(), "true".to_string());
                }
            }
        }

        let system = build_prompt(&self.prompt, variables)?.system;

        let mut messages = Vec::with_capacity(2);
        if let Some(history) = history {
            messages.push(ChatMessage::assistant(format!(
                "Previous conversation:\n{}",
                history
            )));
        }
        messages.push(ChatMessage::user(query));

        let phase = TurnPhase::AwaitingFinalResponse;
        tracing::debug!(?phase, "Requesting response");

        let response = self
            .client
            .chat(&self.settings.request(system, messages))
            .await?;

        let phase = TurnPhase::Terminal;
        tracing::debug!(?phase, "Turn complete");
        Ok(response.text())
    }
}

#[async_trait::async_trait]
impl ResponseGenerator for EmulatedToolGenerator {
    async fn respond(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolSchema],
        registry: &mut ToolRegistry,
    ) -> String {
        match self.run(query, history, tools, registry).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(provider = self.client.provider_name(), "Generation failed: {}", e);
                failure_message(&e)
            }
        }
    }
}
