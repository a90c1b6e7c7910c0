//! Scripted in-process chat client.
//!
//! Replays queued responses in order and records every request it sees.
//! Once the script runs dry it echoes the last user message, so the CLI can
//! run end to end without a model server.

use crate::client::{ChatRequest, ChatResponse, LlmClient};
use lectern_core::AppResult;
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct MockClient {
    native_tools: bool,
    script: Mutex<VecDeque<AppResult<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockClient {
    /// Mock that reports native tool support.
    pub fn native() -> Self {
        Self::with_tool_support(true)
    }

    /// Mock that has to be driven through emulated tool calls.
    pub fn emulated() -> Self {
        Self::with_tool_support(false)
    }

    pub fn with_tool_support(native_tools: bool) -> Self {
        Self {
            native_tools,
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue the next result returned by `chat`.
    pub fn push(&self, result: AppResult<ChatResponse>) -> &Self {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(result);
        self
    }

    /// Queue a plain text reply.
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.push(Ok(ChatResponse::text_only("mock", text)))
    }

    /// Number of `chat` calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Copies of every request received, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::native()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn supports_tools(&self) -> bool {
        self.native_tools
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        match scripted {
            Some(result) => result,
            None => {
                let last_user = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == crate::client::Role::User)
                    .map(|m| m.text_content())
                    .unwrap_or_default();
                tracing::debug!("Mock script exhausted, echoing last user message");
                Ok(ChatResponse::text_only(
                    "mock",
                    format!("Mock response to: {}", last_user),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;
    use lectern_core::AppError;

    #[tokio::test]
    async fn test_replays_script_in_order() {
        let client = MockClient::native();
        client.push_text("first").push(Err(AppError::RateLimited("slow".to_string())));

        let request = ChatRequest::new("mock", vec![ChatMessage::user("hi")]);
        assert_eq!(client.chat(&request).await.unwrap().text(), "first");
        assert!(matches!(
            client.chat(&request).await,
            Err(AppError::RateLimited(_))
        ));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_echo_when_script_empty() {
        let client = MockClient::emulated();
        assert!(!client.supports_tools());

        let request = ChatRequest::new("mock", vec![ChatMessage::user("What is MCP?")]);
        let response = client.chat(&request).await.unwrap();
        assert_eq!(response.text(), "Mock response to: What is MCP?");
        assert_eq!(client.requests()[0].messages.len(), 1);
    }
}
