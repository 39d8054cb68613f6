//! OpenAI-compatible API provider for embeddings

use crate::{config::EmbeddingConfig, error::EmbeddingError, provider::EmbeddingProvider};
use async_openai::types::{CreateEmbeddingRequest, EmbeddingInput};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use repograph_core::error::Result;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maximum characters accepted for a single text.
/// Treating 1 char = 1 token to stay under the model context.
const MAX_TEXT_CHARS: usize = 8192;

/// Batches in flight at once. Results are reassembled in input order.
const MAX_CONCURRENT_REQUESTS: usize = 2;

/// OpenAI-compatible API provider
pub struct OpenAiApiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
    batch_size: usize,
    retry_attempts: usize,
}

impl OpenAiApiProvider {
    /// Create a new API provider from configuration
    pub(crate) fn new(config: EmbeddingConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| EmbeddingError::ModelLoadError(format!("Invalid configuration: {e}")))?;

        info!("Initializing OpenAI-compatible API embeddings");
        info!("  Model: {}", config.model);
        info!("  Dimensions: {}", config.embedding_dimension);
        info!("  Batch size: {}", config.texts_per_api_request);
        info!("  Retry attempts: {}", config.retry_attempts);

        let mut openai_config = OpenAIConfig::new();
        if let Some(ref base_url) = config.api_base_url {
            info!("  Base URL: {base_url}");
            openai_config = openai_config.with_api_base(base_url);
        }
        match config.api_key {
            Some(ref api_key) => openai_config = openai_config.with_api_key(api_key),
            None => warn!("No embeddings API key configured; requests will likely be rejected"),
        }

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model,
            dimensions: config.embedding_dimension,
            batch_size: config.texts_per_api_request,
            retry_attempts: config.retry_attempts,
        })
    }

    /// Send one batch, retrying with exponential backoff
    async fn embed_batch(
        &self,
        indices: Vec<usize>,
        texts: Vec<String>,
    ) -> std::result::Result<Vec<(usize, Vec<f32>)>, EmbeddingError> {
        let mut attempt = 0;

        loop {
            let request = CreateEmbeddingRequest {
                model: self.model.clone(),
                input: EmbeddingInput::StringArray(texts.clone()),
                encoding_format: None,
                dimensions: None,
                user: None,
            };

            match self.client.embeddings().create(request).await {
                Ok(response) => {
                    let mut sorted: Vec<(usize, Vec<f32>)> = response
                        .data
                        .into_iter()
                        .map(|emb| (emb.index as usize, emb.embedding))
                        .collect();
                    sorted.sort_by_key(|(idx, _)| *idx);

                    if sorted.len() != indices.len() {
                        return Err(EmbeddingError::InferenceError(format!(
                            "Expected {} embeddings, got {}",
                            indices.len(),
                            sorted.len()
                        )));
                    }
                    for (_, embedding) in &sorted {
                        if embedding.len() != self.dimensions {
                            return Err(EmbeddingError::DimensionMismatch {
                                expected: self.dimensions,
                                actual: embedding.len(),
                            });
                        }
                    }

                    return Ok(indices
                        .into_iter()
                        .zip(sorted.into_iter().map(|(_, emb)| emb))
                        .collect());
                }
                Err(e) if attempt < self.retry_attempts => {
                    attempt += 1;
                    error!("Embedding request failed for {} texts: {e}", texts.len());

                    // 2s, 4s, 8s, ... capped at 60s
                    let backoff_secs = (2 * 2u64.pow(attempt as u32 - 1)).min(60);
                    let backoff = Duration::from_secs(backoff_secs);
                    warn!(
                        "Retrying in {backoff:?} (attempt {attempt}/{})",
                        self.retry_attempts
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    return Err(EmbeddingError::InferenceError(format!(
                        "API request failed after {} attempts: {e}",
                        self.retry_attempts
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiApiProvider {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = vec![None; texts.len()];

        // Oversized and empty texts are left as None
        let mut accepted: Vec<(usize, String)> = Vec::new();
        for (i, text) in texts.into_iter().enumerate() {
            let char_count = text.chars().count();
            if char_count == 0 || char_count > MAX_TEXT_CHARS {
                debug!("Skipping text at index {i} ({char_count} chars)");
                continue;
            }
            accepted.push((i, text));
        }

        let skipped = all_embeddings.len() - accepted.len();
        if skipped > 0 {
            warn!(
                "Skipped {skipped}/{} texts that were empty or longer than {MAX_TEXT_CHARS} chars",
                all_embeddings.len()
            );
        }

        let batches: Vec<Vec<(usize, String)>> = accepted
            .chunks(self.batch_size)
            .map(<[(usize, String)]>::to_vec)
            .collect();

        debug!(
            "Created {} batches (batch_size={})",
            batches.len(),
            self.batch_size
        );

        let results = stream::iter(batches)
            .map(|batch| {
                let (indices, texts): (Vec<usize>, Vec<String>) = batch.into_iter().unzip();
                self.embed_batch(indices, texts)
            })
            .buffered(MAX_CONCURRENT_REQUESTS)
            .collect::<Vec<_>>()
            .await;

        for result in results {
            let batch_results =
                result.map_err(|e: EmbeddingError| -> repograph_core::error::Error { e.into() })?;
            for (orig_idx, embedding) in batch_results {
                all_embeddings[orig_idx] = Some(embedding);
            }
        }

        Ok(all_embeddings)
    }

    fn embedding_dimension(&self) -> usize {
        self.dimensions
    }
}

/// Create a new OpenAI-compatible API provider from configuration
pub fn create_api_provider(config: EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    let provider = OpenAiApiProvider::new(config)?;
    Ok(Box::new(provider))
}
