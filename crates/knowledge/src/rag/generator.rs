//! Response generation over a chat backend.
//!
//! Two protocols share one interface: backends that request tool calls
//! themselves get a bounded tool round, the rest get course content fetched
//! up front from a heuristic reading of the query. The protocol is chosen
//! from the client's declared capability.

use super::emulated::EmulatedToolGenerator;
use super::native::NativeToolGenerator;
use crate::tools::ToolRegistry;
use lectern_core::{AppError, AppResult};
use lectern_llm::{ChatMessage, ChatRequest, LlmClient, ToolSchema};
use lectern_prompt::{load_builtin, load_prompt, PromptDefinition};
use std::path::Path;
use std::sync::Arc;

pub const AUTH_FAILURE_MESSAGE: &str =
    "Error: Invalid API key. Please check your API key configuration.";
pub const RATE_LIMIT_MESSAGE: &str = "Error: API rate limit exceeded. Please try again in a moment.";
pub const QUOTA_MESSAGE: &str =
    "Error: Insufficient API credits. Please add credits to your account to continue using the service.";

/// Progress of one generation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingFirstResponse,
    ToolRoundPending,
    AwaitingFinalResponse,
    Terminal,
}

/// Model parameters shared by both protocols.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationSettings {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature: 0.0,
        }
    }

    pub(crate) fn request(&self, system: String, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest::new(self.model.clone(), messages)
            .with_system(system)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

#[async_trait::async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Answer `query`, using `registry` for any tool calls.
    ///
    /// Always returns text. Backend failures come back as fixed messages.
    async fn respond(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolSchema],
        registry: &mut ToolRegistry,
    ) -> String;
}

/// Pick the generator matching the client's tool capability.
///
/// Prompts are read from `workspace` overrides when given, else built-ins.
pub fn create_generator(
    client: Arc<dyn LlmClient>,
    settings: GenerationSettings,
    workspace: Option<&Path>,
) -> AppResult<Arc<dyn ResponseGenerator>> {
    let native = client.supports_tools();
    tracing::debug!(
        provider = client.provider_name(),
        native_tools = native,
        "Selecting response generator"
    );

    if native {
        let prompt = resolve_prompt(workspace, lectern_prompt::NATIVE_PROMPT_ID)?;
        Ok(Arc::new(NativeToolGenerator::new(client, settings, prompt)))
    } else {
        let prompt = resolve_prompt(workspace, lectern_prompt::EMULATED_PROMPT_ID)?;
        Ok(Arc::new(EmulatedToolGenerator::new(client, settings, prompt)))
    }
}

fn resolve_prompt(workspace: Option<&Path>, id: &str) -> AppResult<PromptDefinition> {
    match workspace {
        Some(path) => load_prompt(path, id),
        None => load_builtin(id),
    }
}

/// User-facing text for a failed turn.
pub fn failure_message(err: &AppError) -> String {
    match err {
        AppError::Auth(_) => AUTH_FAILURE_MESSAGE.to_string(),
        AppError::RateLimited(_) => RATE_LIMIT_MESSAGE.to_string(),
        AppError::QuotaExceeded(_) => QUOTA_MESSAGE.to_string(),
        AppError::Llm(msg) | AppError::Unavailable(msg) => {
            format!("Error: API request failed - {}", msg)
        }
        other => format!("Error: An unexpected error occurred - {}", other),
    }
}
