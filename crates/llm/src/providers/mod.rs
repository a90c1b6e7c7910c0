//! LLM provider implementations.

pub mod anthropic;
pub mod localai;
pub mod mock;
pub mod ollama;

pub use anthropic::AnthropicClient;
pub use localai::LocalAiClient;
pub use mock::MockClient;
pub use ollama::OllamaClient;

use lectern_core::AppError;
use reqwest::StatusCode;

/// Map a non-success HTTP response to the matching error kind.
pub(crate) fn classify_http_error(provider: &str, status: StatusCode, body: &str) -> AppError {
    let lowered = body.to_lowercase();

    match status.as_u16() {
        401 | 403 => AppError::Auth(format!("{} rejected the credentials: {}", provider, body)),
        429 => AppError::RateLimited(format!("{} ({}): {}", provider, status, body)),
        402 => AppError::QuotaExceeded(format!("{} ({}): {}", provider, status, body)),
        _ if lowered.contains("credit balance") || lowered.contains("insufficient_quota") => {
            AppError::QuotaExceeded(format!("{} ({}): {}", provider, status, body))
        }
        _ => AppError::Llm(format!("{} API error ({}): {}", provider, status, body)),
    }
}

/// Map a transport failure to the matching error kind.
pub(crate) fn classify_transport_error(provider: &str, err: reqwest::Error) -> AppError {
    if err.is_connect() || err.is_timeout() {
        AppError::Unavailable(format!("{} is not reachable: {}", provider, err))
    } else {
        AppError::Llm(format!("Failed to send request to {}: {}", provider, err))
    }
}
