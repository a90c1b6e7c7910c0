//! Generation for backends with native tool calling.
//!
//! At most two model calls per turn: the first may request tools, the
//! second sees every tool result and is always final.

use super::generator::{failure_message, GenerationSettings, ResponseGenerator, TurnPhase};
use crate::tools::ToolRegistry;
use lectern_core::AppResult;
use lectern_llm::{ChatMessage, ContentBlock, LlmClient, Role, ToolSchema};
use lectern_prompt::{build_prompt, PromptDefinition, HISTORY_VAR};
use std::collections::HashMap;
use std::sync::Arc;

pub struct NativeToolGenerator {
    client: Arc<dyn LlmClient>,
    settings: GenerationSettings,
    prompt: PromptDefinition,
}

impl NativeToolGenerator {
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

    async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolSchema],
        registry: &mut ToolRegistry,
    ) -> AppResult<String> {
        let mut variables = HashMap::new();
        if let Some(history) = history {
            variables.insert(HISTORY_VAR.to_string(), history.to_string());
        }
        let system = build_prompt(&self.prompt, variables)?.system;

        let mut messages = vec![ChatMessage::user(query)];

        let mut phase = TurnPhase::AwaitingFirstResponse;
        tracing::debug!(?phase, tools = tools.len(), "Requesting first response");

        let request = self
            .settings
            .request(system.clone(), messages.clone())
            .with_tools(tools.to_vec());
        let first = self.client.chat(&request).await?;

        let calls = first.tool_calls();
        if calls.is_empty() {
            phase = TurnPhase::Terminal;
            tracing::debug!(?phase, "Answered without tools");
            return Ok(first.text());
        }

        phase = TurnPhase::ToolRoundPending;
        tracing::debug!(?phase, calls = calls.len(), "Model requested tools");

        messages.push(ChatMessage::new(Role::Assistant, first.content));

        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            let output = registry.dispatch(&call.name, &call.input).await;
            let is_error = output.is_error();
            results.push(ContentBlock::tool_result(
                call.id.clone(),
                output.content,
                is_error,
            ));
        }
        messages.push(ChatMessage::new(Role::User, results));

        phase = TurnPhase::AwaitingFinalResponse;
        tracing::debug!(?phase, "Requesting final response");

        // No tools offered: the second response is final whatever it signals
        let final_response = self
            .client
            .chat(&self.settings.request(system, messages))
            .await?;

        phase = TurnPhase::Terminal;
        tracing::debug!(?phase, stop_reason = ?final_response.stop_reason, "Turn complete");
        Ok(final_response.text())
    }
}

#[async_trait::async_trait]
impl ResponseGenerator for NativeToolGenerator {
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
                tracing::warn!("Generation failed: {}", e);
                failure_message(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::generator::{QUOTA_MESSAGE, RATE_LIMIT_MESSAGE};
    use crate::tests::fixtures::{sample_registry, sample_store};
    use lectern_core::AppError;
    use lectern_llm::{ChatResponse, LlmUsage, MockClient, StopReason};
    use lectern_prompt::{load_builtin, NATIVE_PROMPT_ID};
    use serde_json::json;

    fn generator(client: Arc<MockClient>) -> NativeToolGenerator {
        NativeToolGenerator::new(
            client,
            GenerationSettings::new("claude-sonnet-4-20250514", 800),
            load_builtin(NATIVE_PROMPT_ID).unwrap(),
        )
    }

    fn tool_use(calls: &[(&str, &str, serde_json::Value)]) -> ChatResponse {
        ChatResponse {
            content: calls
                .iter()
                .map(|(id, name, input)| ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: name.to_string(),
                    input: input.clone(),
                })
                .collect(),
            model: "mock".to_string(),
            stop_reason: StopReason::ToolUse,
            usage: LlmUsage::default(),
        }
    }

    #[tokio::test]
    async fn test_direct_answer_uses_one_call() {
        let client = Arc::new(MockClient::native());
        client.push_text("Paris.");

        let mut registry = sample_registry(sample_store().await);
        let tools = registry.definitions();
        let answer = generator(client.clone())
            .respond("What is the capital of France?", None, &tools, &mut registry)
            .await;

        assert_eq!(answer, "Paris.");
        assert_eq!(client.call_count(), 1);

        let request = &client.requests()[0];
        assert_eq!(request.tools.len(), 2);
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.max_tokens, Some(800));
        assert!(registry.collect_citations().is_empty());
    }

    #[tokio::test]
    async fn test_tool_round_uses_two_calls() {
        let client = Arc::new(MockClient::native());
        client
            .push(Ok(tool_use(&[
                ("call_1", "search_course_content", json!({"query": "MCP", "course_name": "MCP"})),
                ("call_2", "get_course_outline", json!({"course_name": "MCP"})),
            ])))
            .push_text("MCP is the Model Context Protocol.");

        let mut registry = sample_registry(sample_store().await);
        let tools = registry.definitions();
        let answer = generator(client.clone())
            .respond("What is MCP?", None, &tools, &mut registry)
            .await;

        assert_eq!(answer, "MCP is the Model Context Protocol.");
        assert_eq!(client.call_count(), 2);

        let final_request = &client.requests()[1];
        assert!(final_request.tools.is_empty());
        assert_eq!(final_request.messages.len(), 3);
        assert_eq!(final_request.messages[1].role, Role::Assistant);

        let results = &final_request.messages[2];
        assert_eq!(results.role, Role::User);
        assert_eq!(results.content.len(), 2);
        match &results.content[0] {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                assert_eq!(tool_use_id, "call_1");
                assert!(content.starts_with("[Introduction to MCP"));
                assert!(!is_error);
            }
            other => panic!("Expected tool result, got {:?}", other),
        }
        match &results.content[1] {
            ContentBlock::ToolResult { tool_use_id, content, .. } => {
                assert_eq!(tool_use_id, "call_2");
                assert!(content.contains("Total Lessons: 3"));
            }
            other => panic!("Expected tool result, got {:?}", other),
        }

        assert!(!registry.collect_citations().is_empty());
    }

    #[tokio::test]
    async fn test_second_tool_request_is_not_followed() {
        let client = Arc::new(MockClient::native());
        client
            .push(Ok(tool_use(&[(
                "call_1",
                "search_course_content",
                json!({"query": "MCP"}),
            )])))
            .push(Ok(tool_use(&[(
                "call_2",
                "search_course_content",
                json!({"query": "more"}),
            )])));

        let mut registry = sample_registry(sample_store().await);
        let tools = registry.definitions();
        let answer = generator(client.clone())
            .respond("What is MCP?", None, &tools, &mut registry)
            .await;

        assert_eq!(answer, "");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_result_is_error_text() {
        let client = Arc::new(MockClient::native());
        client
            .push(Ok(tool_use(&[("call_1", "nonexistent_tool", json!({}))])))
            .push_text("I could not look that up.");

        let mut registry = sample_registry(sample_store().await);
        let tools = registry.definitions();
        generator(client.clone())
            .respond("What is MCP?", None, &tools, &mut registry)
            .await;

        match &client.requests()[1].messages[2].content[0] {
            ContentBlock::ToolResult { content, is_error, .. } => {
                assert_eq!(content, "Tool 'nonexistent_tool' not found");
                assert!(is_error);
            }
            other => panic!("Expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_history_goes_into_system_prompt() {
        let client = Arc::new(MockClient::native());
        client.push_text("Sure.");

        let mut registry = ToolRegistry::new();
        generator(client.clone())
            .respond(
                "And lesson 2?",
                Some("User: What is MCP?\nAssistant: A protocol."),
                &[],
                &mut registry,
            )
            .await;

        let request = &client.requests()[0];
        let system = request.system.as_deref().unwrap();
        assert!(system.contains("Previous conversation:\nUser: What is MCP?"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].text_content(), "And lesson 2?");
    }

    #[tokio::test]
    async fn test_backend_failures_become_fixed_text() {
        let client = Arc::new(MockClient::native());
        client
            .push(Err(AppError::RateLimited("429".into())))
            .push(Ok(tool_use(&[(
                "call_1",
                "search_course_content",
                json!({"query": "MCP"}),
            )])))
            .push(Err(AppError::QuotaExceeded("credit balance too low".into())));

        let mut registry = sample_registry(sample_store().await);
        let tools = registry.definitions();
        let generator = generator(client.clone());

        let first = generator.respond("What is MCP?", None, &tools, &mut registry).await;
        assert_eq!(first, RATE_LIMIT_MESSAGE);

        let second = generator.respond("What is MCP?", None, &tools, &mut registry).await;
        assert_eq!(second, QUOTA_MESSAGE);
    }
}
