//! Error types for Lectern.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! language-model backends, retrieval and prompt errors.

use thiserror::Error;

/// Unified error type for Lectern.
///
/// Backend failures are split by kind (auth, rate limit, quota,
/// availability) so the orchestrator can turn each into a fixed
/// user-facing message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic LLM provider errors (bad request, malformed response)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Backend rejected the credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Backend throttled the request
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Backend account is out of credits or quota
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Semantic store, ingestion and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
