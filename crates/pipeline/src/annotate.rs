//! Embedding annotation of graph nodes

use repograph_core::node::Node;
use repograph_embeddings::EmbeddingManager;
use std::sync::Arc;
use tracing::{debug, warn};

/// Text embedded for a node.
///
/// File and function nodes embed the first `max_chars` characters of their
/// attached code; every other node, and a file without content, embeds its
/// name.
pub fn embedding_text(node: &Node, max_chars: usize) -> String {
    if node.node_type.embeds_content() {
        if let Some(code) = node.code.as_deref().filter(|c| !c.trim().is_empty()) {
            return code.chars().take(max_chars).collect();
        }
    }
    node.name.clone()
}

/// Computes and stores an embedding for every node of a subtree
pub struct EmbeddingAnnotator {
    manager: Arc<EmbeddingManager>,
    max_text_chars: usize,
    batch_size: usize,
}

impl EmbeddingAnnotator {
    pub fn new(manager: Arc<EmbeddingManager>, max_text_chars: usize, batch_size: usize) -> Self {
        Self {
            manager,
            max_text_chars,
            batch_size: batch_size.max(1),
        }
    }

    /// Embed every node of the subtree rooted at `root`.
    ///
    /// Texts are sent in batches and the vectors written back by pre-order
    /// index. A failed batch is retried one text at a time so a single bad
    /// node does not cost its siblings their embeddings. Returns the number
    /// of nodes left without an embedding.
    pub async fn annotate(&self, root: &mut Node) -> usize {
        let texts: Vec<String> = root
            .iter()
            .map(|node| embedding_text(node, self.max_text_chars))
            .collect();

        let mut vectors: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            match self.manager.embed(batch.to_vec()).await {
                Ok(results) if results.len() == batch.len() => vectors.extend(results),
                Ok(results) => {
                    warn!(
                        "Embedding batch returned {} vectors for {} texts, retrying individually",
                        results.len(),
                        batch.len()
                    );
                    vectors.extend(self.embed_individually(batch).await);
                }
                Err(e) => {
                    warn!("Embedding batch failed, retrying individually: {e}");
                    vectors.extend(self.embed_individually(batch).await);
                }
            }
        }

        let mut failures = 0;
        let mut vectors = vectors.into_iter();
        root.walk_mut(&mut |node| match vectors.next().flatten() {
            Some(vector) => node.embedding = vector,
            None => {
                warn!("No embedding for {} node {:?}", node.node_type, node.name);
                failures += 1;
            }
        });

        debug!("Annotated {} nodes under {}", texts.len(), root.name);
        failures
    }

    async fn embed_individually(&self, batch: &[String]) -> Vec<Option<Vec<f32>>> {
        let mut out = Vec::with_capacity(batch.len());
        for text in batch {
            match self.manager.embed_one(text).await {
                Ok(vector) => out.push(Some(vector)),
                Err(e) => {
                    debug!("Single embedding failed: {e}");
                    out.push(None);
                }
            }
        }
        out
    }
}
