//! LLM integration crate for Lectern.
//!
//! This crate provides a provider-agnostic chat abstraction. Providers
//! declare whether they can request tool calls natively; the orchestrator in
//! `lectern-knowledge` picks its tool protocol from that capability.
//!
//! # Providers
//! - **Anthropic**: Messages API with native tool use
//! - **Ollama**: local runtime, plain chat
//! - **LocalAI**: OpenAI-compatible chat completions, plain chat
//! - **Mock**: scripted responses for tests and offline runs
//!
//! # Example
//! ```no_run
//! use lectern_llm::{ChatMessage, ChatRequest, LlmClient, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = ChatRequest::new("llama3.2", vec![ChatMessage::user("Hello, world!")]);
//! let response = client.chat(&request).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    ChatMessage, ChatRequest, ChatResponse, ContentBlock, LlmClient, LlmUsage, Role, StopReason,
    ToolCall, ToolSchema,
};
pub use factory::create_client;
pub use providers::{AnthropicClient, LocalAiClient, MockClient, OllamaClient};
pub use types::ProviderType;
