//! Lectern Core Library
//!
//! Foundational utilities shared by every Lectern crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{
    default_model, AppConfig, ProviderConfig, RagSettings, DEFAULT_OLLAMA_EMBEDDING_MODEL,
};
pub use error::{AppError, AppResult};
