//! LLM provider factory.
//!
//! Builds a client from the provider name and the already-resolved endpoint,
//! API key and API version. Secret lookup happens in configuration.

use crate::client::LlmClient;
use crate::providers::{AnthropicClient, LocalAiClient, MockClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("anthropic", "ollama", "localai", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key (required for Anthropic)
/// * `api_version` - Optional `anthropic-version` header override
///
/// # Errors
/// Returns error if the provider is unknown or a required secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    api_version: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;
    let base_url = endpoint.or(provider_type.default_endpoint());

    match provider_type {
        ProviderType::Anthropic => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| "Anthropic provider requires API key".to_string())?;
            let mut client =
                AnthropicClient::with_base_url(base_url.unwrap_or_default(), api_key);
            if let Some(version) = api_version {
                client = client.with_api_version(version);
            }
            Ok(Arc::new(client))
        }
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_base_url(
            base_url.unwrap_or_default(),
        ))),
        ProviderType::LocalAi => {
            let mut client = LocalAiClient::with_base_url(base_url.unwrap_or_default());
            if let Some(key) = api_key {
                client = client.with_api_key(key);
            }
            Ok(Arc::new(client))
        }
        ProviderType::Mock => Ok(Arc::new(MockClient::native())),
    }
}
