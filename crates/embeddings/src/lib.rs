//! Embedding generation for graph nodes and retrieval queries
//!
//! This crate wraps the embedding model behind the [`EmbeddingProvider`] trait
//! so the pipeline and the retrieval server never talk to a model directly.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use repograph_core::error::{Error, Result, ResultExt};
use std::sync::Arc;

mod api_provider;
pub mod config;
pub mod error;
mod mock_provider;
pub mod provider;

pub use api_provider::create_api_provider;
pub use config::{EmbeddingConfig, EmbeddingConfigBuilder, EmbeddingProviderType};
pub use error::EmbeddingError;
pub use mock_provider::MockEmbeddingProvider;
pub use provider::EmbeddingProvider;

/// Helper function to parse provider type from string
fn parse_provider_type(provider: &str) -> EmbeddingProviderType {
    match provider.to_lowercase().as_str() {
        "mock" => EmbeddingProviderType::Mock,
        _ => EmbeddingProviderType::Api,
    }
}

/// Create an embedding manager from the application Config
///
/// Converts the main Config's EmbeddingsConfig into the crate's
/// EmbeddingConfig. The API key falls back to the EMBEDDING_API_KEY, then
/// OPENAI_API_KEY, environment variables when the config leaves it unset.
pub fn create_embedding_manager_from_app_config(
    embeddings_config: &repograph_core::config::EmbeddingsConfig,
) -> Result<Arc<EmbeddingManager>> {
    let mut config_builder = EmbeddingConfigBuilder::default()
        .provider(parse_provider_type(&embeddings_config.provider))
        .model(embeddings_config.model.clone())
        .texts_per_api_request(embeddings_config.texts_per_api_request)
        .embedding_dimension(embeddings_config.embedding_dimension)
        .retry_attempts(embeddings_config.retry_attempts);

    if let Some(ref api_base_url) = embeddings_config.api_base_url {
        config_builder = config_builder.api_base_url(api_base_url.clone());
    }

    let api_key = embeddings_config
        .api_key
        .clone()
        .or_else(|| std::env::var("EMBEDDING_API_KEY").ok())
        .or_else(|| std::env::var("OPENAI_API_KEY").ok());
    if let Some(key) = api_key {
        config_builder = config_builder.api_key(key);
    }

    let embedding_manager = EmbeddingManager::from_config(config_builder.build())
        .context("Failed to create embedding manager")?;

    Ok(Arc::new(embedding_manager))
}

/// Manager for handling embedding generation with immutable configuration
pub struct EmbeddingManager {
    provider: Arc<dyn EmbeddingProvider>,
    model_version: String,
}

impl EmbeddingManager {
    /// Creates a new embedding manager with the specified provider and model version
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model_version: String) -> Self {
        Self {
            provider,
            model_version,
        }
    }

    /// Initialize manager from configuration
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let model_version = config.model.clone();

        let provider = match config.provider {
            EmbeddingProviderType::Api => Arc::from(create_api_provider(config)?),
            EmbeddingProviderType::Mock => {
                let provider = MockEmbeddingProvider::new(config.embedding_dimension);
                Arc::new(provider) as Arc<dyn EmbeddingProvider>
            }
        };

        Ok(Self {
            provider,
            model_version,
        })
    }

    /// Manager backed by the deterministic mock provider
    pub fn mock(dimension: usize) -> Self {
        Self::new(
            Arc::new(MockEmbeddingProvider::new(dimension)),
            "mock".to_string(),
        )
    }

    /// Get reference to the embedding provider
    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Model identifier the vectors were produced with
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Generate embeddings for texts
    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>> {
        self.provider.embed(texts).await
    }

    /// Generate the embedding of a single text
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.provider
            .embed(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| Error::embedding("Provider returned no embedding for text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mock_app_config(api_key: Option<&str>) -> repograph_core::config::EmbeddingsConfig {
        repograph_core::config::EmbeddingsConfig {
            provider: "mock".to_string(),
            model: "test-model".to_string(),
            embedding_dimension: 16,
            texts_per_api_request: 10,
            api_base_url: Some("http://localhost:8000/v1".to_string()),
            api_key: api_key.map(str::to_string),
            retry_attempts: 3,
            max_text_chars: 512,
        }
    }

    #[test]
    fn test_parse_provider_type() {
        assert_eq!(parse_provider_type("mock"), EmbeddingProviderType::Mock);
        assert_eq!(parse_provider_type("MOCK"), EmbeddingProviderType::Mock);
        assert_eq!(parse_provider_type("api"), EmbeddingProviderType::Api);
        assert_eq!(parse_provider_type("unknown"), EmbeddingProviderType::Api);
    }

    #[tokio::test]
    async fn test_manager_from_app_config_uses_mock() {
        let manager = create_embedding_manager_from_app_config(&mock_app_config(None)).unwrap();
        assert_eq!(manager.model_version(), "test-model");
        assert_eq!(manager.provider().embedding_dimension(), 16);

        let embeddings = manager
            .embed(vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.as_ref().map(Vec::len) == Some(16)));
    }

    #[tokio::test]
    async fn test_api_key_in_config_is_accepted() {
        let result = create_embedding_manager_from_app_config(&mock_app_config(Some("key")));
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_embed_one_matches_batch() {
        let manager = EmbeddingManager::mock(8);
        let single = manager.embed_one("hello").await.unwrap();
        let batch = manager.embed(vec!["hello".to_string()]).await.unwrap();
        assert_eq!(Some(single), batch.into_iter().next().flatten());
    }

    #[test]
    fn test_builder_defaults() {
        let config = EmbeddingConfigBuilder::new().model("m").build();
        assert_eq!(config.provider(), EmbeddingProviderType::Api);
        assert_eq!(config.embedding_dimension(), 1536);
        assert!(config.validate().is_ok());

        let invalid = EmbeddingConfigBuilder::new().texts_per_api_request(0).build();
        assert!(invalid.validate().is_err());
    }
}
