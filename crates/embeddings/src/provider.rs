//! Trait definition for embedding providers

use async_trait::async_trait;
use repograph_core::error::Result;

/// Trait for embedding providers
///
/// The graph pipeline treats the model as a pure function `text -> vector`;
/// this trait is the seam where that function is plugged in.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a list of texts
    ///
    /// # Arguments
    /// * `texts` - List of text strings to embed
    ///
    /// # Returns
    /// One optional vector per input text, in input order. `None` marks a text
    /// the provider could not embed (for example one exceeding its context).
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>>;

    /// Get the embedding dimension
    fn embedding_dimension(&self) -> usize;
}
