//! LocalAI provider using the OpenAI-compatible chat completions endpoint.
//!
//! Any server speaking `POST /v1/chat/completions` works here. Tool calling
//! is not requested from these backends.

use super::{classify_http_error, classify_transport_error};
use crate::client::{ChatRequest, ChatResponse, LlmClient, LlmUsage, StopReason};
use lectern_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// LocalAI (OpenAI-compatible) client.
pub struct LocalAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl LocalAiClient {
    /// Default URL: http://localhost:8080
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:8080")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: "local".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Bearer token sent with each request; LocalAI accepts any value by default.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    fn to_completion_request<'a>(&self, request: &'a ChatRequest) -> CompletionRequest<'a> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            messages.push(CompletionMessage {
                role: "system",
                content: system.clone(),
            });
        }

        messages.extend(request.messages.iter().map(|m| CompletionMessage {
            role: m.role.as_str(),
            content: m.text_content(),
        }));

        CompletionRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn convert_response(&self, response: CompletionResponse) -> AppResult<ChatResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("LocalAI returned no choices".to_string()))?;

        let mut chat = ChatResponse::text_only(
            response.model,
            choice.message.content.unwrap_or_default(),
        );
        if choice.finish_reason.as_deref() == Some("length") {
            chat.stop_reason = StopReason::MaxTokens;
        }
        if let Some(usage) = response.usage {
            chat.usage = LlmUsage::new(usage.prompt_tokens, usage.completion_tokens);
        }
        Ok(chat)
    }
}

impl Default for LocalAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for LocalAiClient {
    fn provider_name(&self) -> &str {
        "localai"
    }

    fn supports_tools(&self) -> bool {
        false
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!(model = %request.model, "Sending chat completion to LocalAI");

        let body = self.to_completion_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport_error("LocalAI", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_http_error("LocalAI", status, &error_text));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse LocalAI response: {}", e)))?;

        self.convert_response(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;

    #[test]
    fn test_request_conversion() {
        let client = LocalAiClient::new();
        let request = ChatRequest::new("gpt-3.5-turbo", vec![ChatMessage::user("What is MCP?")])
            .with_system("system text")
            .with_max_tokens(800);

        let body = serde_json::to_value(client.to_completion_request(&request)).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "What is MCP?");
        assert_eq!(body["max_tokens"], 800);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let client = LocalAiClient::new();
        let raw: CompletionResponse = serde_json::from_str(
            r#"{"model":"gpt-3.5-turbo","choices":[{"index":0,
                "message":{"role":"assistant","content":"Hello"},"finish_reason":"stop"}],
                "usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}}"#,
        )
        .unwrap();

        let response = client.convert_response(raw).unwrap();
        assert_eq!(response.text(), "Hello");
        assert_eq!(response.usage.total_tokens, 4);
    }

    #[test]
    fn test_empty_choices_is_error() {
        let client = LocalAiClient::new();
        let raw: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(client.convert_response(raw), Err(AppError::Llm(_))));
    }
}
