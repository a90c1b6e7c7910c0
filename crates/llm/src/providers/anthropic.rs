//! Anthropic Messages API provider.
//!
//! The only built-in backend with native tool calling: a response may stop
//! with `tool_use` and carry `tool_use` blocks instead of (or next to) text.
//! API: https://docs.anthropic.com/en/api/messages

use super::{classify_http_error, classify_transport_error};
use crate::client::{
    ChatMessage, ChatRequest, ChatResponse, ContentBlock, LlmClient, LlmUsage, StopReason,
    ToolSchema,
};
use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 800;

/// Anthropic API request format.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "<[ToolSchema]>::is_empty")]
    tools: &'a [ToolSchema],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Anthropic API response format.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<ResponseUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Anthropic LLM client.
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a client against the public API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a client against a custom base URL (proxy, gateway, test server).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the `anthropic-version` header.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    fn to_messages_request<'a>(&self, request: &'a ChatRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: request.system.as_deref(),
            messages: &request.messages,
            temperature: request.temperature,
            tools: &request.tools,
            tool_choice: (!request.tools.is_empty()).then_some(ToolChoice { kind: "auto" }),
        }
    }

    fn convert_response(&self, response: MessagesResponse) -> ChatResponse {
        let content = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(ContentBlock::Text { text }),
                ResponseBlock::ToolUse { id, name, input } => {
                    Some(ContentBlock::ToolUse { id, name, input })
                }
                ResponseBlock::Unsupported => None,
            })
            .collect();

        let stop_reason = match response.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => StopReason::EndTurn,
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            _ => StopReason::Other,
        };

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        ChatResponse {
            content,
            model: response.model,
            stop_reason,
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!(
            model = %request.model,
            tools = request.tools.len(),
            "Sending messages request to Anthropic"
        );

        let body = self.to_messages_request(request);
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport_error("Anthropic", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_http_error("Anthropic", status, &error_text));
        }

        let messages_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Anthropic response: {}", e)))?;

        tracing::debug!(
            stop_reason = ?messages_response.stop_reason,
            blocks = messages_response.content.len(),
            "Received response from Anthropic"
        );

        Ok(self.convert_response(messages_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_schema() -> ToolSchema {
        ToolSchema {
            name: "search_course_content".to_string(),
            description: "Search course materials".to_string(),
            input_schema: json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = AnthropicClient::with_base_url("http://localhost:8081/", "key");
        assert_eq!(client.provider_name(), "anthropic");
        assert!(client.supports_tools());
        assert_eq!(client.base_url, "http://localhost:8081");
    }

    #[test]
    fn test_request_with_tools_sets_auto_choice() {
        let client = AnthropicClient::new("key");
        let request = ChatRequest::new("claude-sonnet-4-20250514", vec![ChatMessage::user("hi")])
            .with_system("system prompt")
            .with_tools(vec![search_schema()])
            .with_temperature(0.0);

        let body = serde_json::to_value(client.to_messages_request(&request)).unwrap();
        assert_eq!(body["system"], "system prompt");
        assert_eq!(body["max_tokens"], 800);
        assert_eq!(body["tools"][0]["name"], "search_course_content");
        assert_eq!(body["tool_choice"]["type"], "auto");
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
    }

    #[test]
    fn test_request_without_tools_omits_tool_fields() {
        let client = AnthropicClient::new("key");
        let request = ChatRequest::new("claude", vec![ChatMessage::user("hi")]);

        let body = serde_json::to_value(client.to_messages_request(&request)).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_tool_result_wire_format() {
        let client = AnthropicClient::new("key");
        let messages = vec![
            ChatMessage::user("What is MCP?"),
            ChatMessage::new(
                crate::client::Role::User,
                vec![ContentBlock::tool_result("toolu_1", "[Intro - Lesson 1]\ntext", false)],
            ),
        ];
        let request = ChatRequest::new("claude", messages);

        let body = serde_json::to_value(client.to_messages_request(&request)).unwrap();
        let block = &body["messages"][1]["content"][0];
        assert_eq!(block["type"], "tool_result");
        assert_eq!(block["tool_use_id"], "toolu_1");
        assert_eq!(block["is_error"], false);
    }

    #[test]
    fn test_convert_tool_use_response() {
        let client = AnthropicClient::new("key");
        let raw: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude",
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "tool_use", "id": "toolu_1", "name": "search_course_content",
                 "input": {"query": "MCP", "lesson_number": 2}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 7}
        }))
        .unwrap();

        let response = client.convert_response(raw);
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage.total_tokens, 19);

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input["lesson_number"], 2);
    }
}
