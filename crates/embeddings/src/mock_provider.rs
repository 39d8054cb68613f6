//! Mock embedding provider for testing

use crate::provider::EmbeddingProvider;
use async_trait::async_trait;
use repograph_core::error::Result;
use twox_hash::XxHash3_64;

/// Mock embedding provider that derives vectors from a hash of the text.
///
/// Equal texts always map to equal vectors and different texts almost
/// always map to different ones, which is enough to exercise layout and
/// retrieval without a model.
pub struct MockEmbeddingProvider {
    embedding_dim: usize,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with specified embedding dimension
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Deterministic vector for a single text, components in [-1, 1]
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        (0..self.embedding_dim)
            .map(|i| {
                let mut bytes = Vec::with_capacity(text.len() + 8);
                bytes.extend_from_slice(&(i as u64).to_le_bytes());
                bytes.extend_from_slice(text.as_bytes());
                let hash = XxHash3_64::oneshot(&bytes);
                ((hash % 20_001) as f32 / 10_000.0) - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>> {
        Ok(texts
            .iter()
            .map(|text| Some(self.vector_for(text)))
            .collect())
    }

    fn embedding_dimension(&self) -> usize {
        self.embedding_dim
    }
}
