//! Embedding provider trait and factory.

use crate::embeddings::config::{EmbeddingConfig, MOCK_DEFAULT_DIMENSIONS};
use crate::embeddings::providers::{MockProvider, OllamaProvider};
use std::sync::Arc;
use tweetrag_core::{AppError, AppResult};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Expected vector length, when the provider knows it up front
    fn dimensions(&self) -> Option<usize>;

    /// Generate the embedding for one text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Embed several texts in order, stopping at the first failure.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.to_lowercase().as_str() {
        "ollama" => Ok(Arc::new(OllamaProvider::new(config)?)),

        "mock" => {
            let dimensions = config.dimensions.unwrap_or(MOCK_DEFAULT_DIMENSIONS);
            Ok(Arc::new(
                MockProvider::new(dimensions).with_model(config.model.clone()),
            ))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, mock",
            config.provider
        ))),
    }
}
