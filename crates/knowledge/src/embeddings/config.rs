//! Embedding configuration.

use serde::{Deserialize, Serialize};
use tweetrag_core::AppConfig;
use tweetrag_llm::providers::ollama::DEFAULT_OLLAMA_URL;

/// Dimensions used by the mock provider when none are configured.
pub const MOCK_DEFAULT_DIMENSIONS: usize = 384;

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama", "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Expected vector length; checked against every response when set
    #[serde(default)]
    pub dimensions: Option<usize>,

    /// Base URL of the embedding runtime
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per text before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_endpoint() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "mxbai-embed-large".to_string(),
            dimensions: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl EmbeddingConfig {
    /// Mock provider settings for tests and offline runs.
    pub fn mock(dimensions: usize) -> Self {
        Self {
            provider: "mock".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: Some(dimensions),
            ..Default::default()
        }
    }
}

impl From<&AppConfig> for EmbeddingConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            provider: config.embedding_provider.clone(),
            model: config.embedding_model.clone(),
            dimensions: config.embedding_dimensions,
            endpoint: config.ollama_endpoint.clone(),
            timeout_secs: config.request_timeout_secs,
            ..Default::default()
        }
    }
}
