//! Embedding provider trait and factory.

use super::providers::{OllamaEmbeddingProvider, TrigramProvider};
use lectern_core::{
    AppError, AppResult, ProviderConfig, RagSettings, DEFAULT_OLLAMA_EMBEDDING_MODEL,
};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from the RAG settings.
///
/// `ollama` is the `providers.ollama` entry of config.yaml. Its endpoint,
/// `embeddingModel` and `timeout` apply to the Ollama provider; an explicit
/// `rag.embeddingModel` takes precedence over its model.
pub fn create_provider(
    settings: &RagSettings,
    ollama: Option<&ProviderConfig>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.embedding_provider.to_lowercase().as_str() {
        "mock" | "trigram" => Ok(Arc::new(TrigramProvider::new(settings.embedding_dim))),

        "ollama" => {
            let endpoint = ollama
                .and_then(|pc| pc.endpoint())
                .unwrap_or(DEFAULT_OLLAMA_URL);
            let model = settings
                .embedding_model
                .as_deref()
                .or_else(|| ollama.and_then(|pc| pc.embedding_model()))
                .unwrap_or(DEFAULT_OLLAMA_EMBEDDING_MODEL);

            let provider = match ollama.and_then(|pc| pc.timeout()) {
                Some(secs) => OllamaEmbeddingProvider::with_timeout(
                    endpoint,
                    model,
                    settings.embedding_dim,
                    Duration::from_secs(secs),
                )?,
                None => OllamaEmbeddingProvider::new(endpoint, model, settings.embedding_dim)?,
            };
            Ok(Arc::new(provider))
        }

        other => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: mock, ollama",
            other
        ))),
    }
}
