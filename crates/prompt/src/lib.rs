//! Prompt system for Lectern.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions (built-in, overridable per workspace)
//! - Handlebars template rendering
//! - Conversation history and course content injection

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, HISTORY_VAR, SEARCH_EMPTY_VAR, SEARCH_RESULTS_VAR};
pub use loader::{list_prompts, load_builtin, load_prompt, EMULATED_PROMPT_ID, NATIVE_PROMPT_ID};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptContextConfig, PromptDefinition,
    PromptOutputSpec,
};
