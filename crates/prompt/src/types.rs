//! Prompt types for Lectern.
//!
//! This module defines the domain entities for the prompt system.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Behavioral settings
    #[serde(default)]
    pub behavior: PromptBehavior,

    /// Context injection settings
    #[serde(default)]
    pub context: PromptContextConfig,

    /// System prompt template with Handlebars syntax
    pub template: String,

    /// Output specification
    #[serde(default)]
    pub output: PromptOutputSpec,
}

/// Behavioral settings for prompt execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptBehavior {
    /// Tone (e.g., "educational", "technical")
    #[serde(default)]
    pub tone: String,

    /// Style (e.g., "concise", "detailed")
    #[serde(default)]
    pub style: String,
}

/// Which runtime context a prompt consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptContextConfig {
    /// Render the previous conversation into the template (`history`)
    #[serde(rename = "includeHistory", default)]
    pub include_history: bool,

    /// Render pre-fetched course content into the template
    /// (`searchResults` / `searchEmpty`)
    #[serde(rename = "includeSearchContext", default)]
    pub include_search_context: bool,
}

/// Output specification for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    /// Output format (e.g., "text", "markdown")
    pub format: String,
}

impl Default for PromptOutputSpec {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
        }
    }
}

/// A rendered system prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Rendered system instructions
    pub system: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Whether conversation history was rendered
    #[serde(rename = "historyIncluded")]
    pub history_included: bool,

    /// Whether course content (or the empty notice) was rendered
    #[serde(rename = "searchContextIncluded")]
    pub search_context_included: bool,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}
