//! Configuration management for Lectern.
//!
//! Configuration is merged from several sources, lowest precedence first:
//! - Built-in defaults
//! - Config file (`.lectern/config.yaml` in the workspace)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the CLI knows how to build.
pub const KNOWN_PROVIDERS: [&str; 4] = ["anthropic", "ollama", "localai", "mock"];

/// Model used for a provider when config.yaml declares none.
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "anthropic" => Some("claude-sonnet-4-20250514"),
        "ollama" => Some("llama3.2"),
        "localai" => Some("gpt-3.5-turbo"),
        "mock" => Some("mock"),
        _ => None,
    }
}

/// Embedding model requested from Ollama when none is configured.
pub const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .lectern/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Folder with course documents loaded at startup
    pub docs_path: PathBuf,

    /// Active LLM provider ("anthropic", "ollama", "localai", "mock")
    pub provider: String,

    /// Model identifier for the active provider
    pub model: String,

    /// API key override for the active provider
    pub api_key: Option<String>,

    /// Endpoint override for the active provider
    pub endpoint: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations from config.yaml
    pub llm: Option<LlmConfig>,

    /// Retrieval and conversation settings
    pub rag: RagSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    /// Anthropic Messages API
    Anthropic {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        #[serde(rename = "apiVersion")]
        api_version: Option<String>,
    },
    /// Locally hosted runtimes (Ollama, LocalAI)
    SelfHosted {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    /// Get the model name for this provider.
    pub fn model(&self) -> &str {
        match self {
            Self::Anthropic { model, .. } => model,
            Self::SelfHosted { model, .. } => model,
        }
    }

    /// Get the configured endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Anthropic { endpoint, .. } => endpoint.as_deref(),
            Self::SelfHosted { endpoint, .. } => Some(endpoint),
        }
    }

    /// Embedding model declared for a self-hosted runtime.
    pub fn embedding_model(&self) -> Option<&str> {
        match self {
            Self::SelfHosted {
                embedding_model, ..
            } => embedding_model.as_deref(),
            Self::Anthropic { .. } => None,
        }
    }

    /// Request timeout in seconds for a self-hosted runtime.
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Self::SelfHosted { timeout, .. } => *timeout,
            Self::Anthropic { .. } => None,
        }
    }
}

/// Retrieval, chunking and conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Target fragment size in characters
    #[serde(rename = "chunkSize")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring fragments
    #[serde(rename = "chunkOverlap")]
    pub chunk_overlap: usize,

    /// Maximum search results returned by the content-search tool
    #[serde(rename = "maxResults")]
    pub max_results: usize,

    /// Number of exchanges kept per session
    #[serde(rename = "maxHistory")]
    pub max_history: usize,

    /// Output token cap for every model call
    #[serde(rename = "maxTokens")]
    pub max_tokens: u32,

    /// Embedding provider for the semantic store ("mock", "ollama")
    #[serde(rename = "embeddingProvider")]
    pub embedding_provider: String,

    /// Embedding model name; the ollama provider's `embeddingModel` applies when unset
    #[serde(rename = "embeddingModel")]
    pub embedding_model: Option<String>,

    /// Embedding vector dimension
    #[serde(rename = "embeddingDim")]
    pub embedding_dim: usize,

    /// Maximum cosine distance for fuzzy course-name resolution
    #[serde(rename = "courseMatchThreshold")]
    pub course_match_threshold: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            max_results: 5,
            max_history: 2,
            max_tokens: 800,
            embedding_provider: "mock".to_string(),
            embedding_model: None,
            embedding_dim: 384,
            course_match_threshold: 0.65,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    rag: Option<RagSettings>,
    docs: Option<DocsConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocsConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            docs_path: PathBuf::from("docs"),
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: None,
            endpoint: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            rag: RagSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file, environment variables and defaults.
    ///
    /// Environment variables:
    /// - `LECTERN_WORKSPACE`: Override workspace path
    /// - `LECTERN_CONFIG`: Path to config file
    /// - `LECTERN_DOCS`: Folder with course documents
    /// - `LECTERN_PROVIDER`: LLM provider
    /// - `LECTERN_MODEL`: Model identifier
    /// - `LECTERN_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("LECTERN_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("LECTERN_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.lectern_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        if let Ok(docs) = std::env::var("LECTERN_DOCS") {
            config.docs_path = PathBuf::from(docs);
        }

        if let Ok(provider) = std::env::var("LECTERN_PROVIDER") {
            config.switch_provider(provider);
        }

        if let Ok(model) = std::env::var("LECTERN_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("LECTERN_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(docs) = config_file.docs {
            if let Some(path) = docs.path {
                result.docs_path = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(rag) = config_file.rag {
            result.rag = rag;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        docs_path: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        endpoint: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(docs_path) = docs_path {
            self.docs_path = docs_path;
        }

        if let Some(provider) = provider {
            self.switch_provider(provider);
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(endpoint) = endpoint {
            self.endpoint = Some(endpoint);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Make `provider` active with its configured or default model.
    ///
    /// The previous provider's model never carries over; an explicit model
    /// override is applied afterwards by the caller.
    fn switch_provider(&mut self, provider: String) {
        if provider == self.provider {
            return;
        }
        if let Some(pc) = self.get_provider_config(&provider) {
            self.model = pc.model().to_string();
        } else if let Some(model) = default_model(&provider) {
            self.model = model.to_string();
        }
        self.provider = provider;
    }

    /// Get the path to the .lectern directory.
    pub fn lectern_dir(&self) -> PathBuf {
        self.workspace.join(".lectern")
    }

    /// Resolve the docs folder against the workspace.
    pub fn resolved_docs_path(&self) -> PathBuf {
        if self.docs_path.is_absolute() {
            self.docs_path.clone()
        } else {
            self.workspace.join(&self.docs_path)
        }
    }

    /// Get the configuration for a provider, if one was declared in config.yaml.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve the endpoint for a provider: CLI override first, then config.yaml.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        if let Some(ref endpoint) = self.endpoint {
            return Some(endpoint.clone());
        }

        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint().map(str::to_string))
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: `LECTERN_API_KEY`, the provider's `apiKeyEnv`, then
    /// `ANTHROPIC_API_KEY` for the anthropic provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::Anthropic { api_key_env, .. }) =
            self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(&api_key_env) {
                return Some(key);
            }
        }

        if provider == "anthropic" {
            return std::env::var("ANTHROPIC_API_KEY").ok();
        }

        None
    }

    /// Resolve the Anthropic API version header, if configured.
    pub fn resolve_api_version(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::Anthropic { api_version, .. }) => api_version,
            _ => None,
        }
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "anthropic" && self.resolve_api_key(provider).is_none() {
            return Err(AppError::Config(
                "Anthropic API key not found. Set ANTHROPIC_API_KEY or LECTERN_API_KEY"
                    .to_string(),
            ));
        }

        if self.rag.max_results == 0 {
            return Err(AppError::Config("rag.maxResults must be at least 1".to_string()));
        }

        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(AppError::Config(format!(
                "rag.chunkOverlap ({}) must be smaller than rag.chunkSize ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }

        Ok(())
    }
}
