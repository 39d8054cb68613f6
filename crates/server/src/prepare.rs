//! Building the retrieval corpus from the dataset and detail directories

use crate::corpus::{DocumentSource, RagDocument, SentenceEmbedding};
use repograph_core::error::{Result, ResultExt};
use repograph_embeddings::EmbeddingManager;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use unicode_segmentation::UnicodeSegmentation;

/// Words per chunk when embedding a whole document
pub const CHUNK_WORDS: usize = 500;

/// Every scalar leaf of a JSON value as text, in document order; nulls are skipped
pub fn flatten_json_strings(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    collect_leaves(value, &mut out);
    out
}

fn collect_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => map.values().for_each(|v| collect_leaves(v, out)),
        Value::Array(items) => items.iter().for_each(|v| collect_leaves(v, out)),
        Value::String(s) => out.push(s.clone()),
        Value::Null => {}
        other => out.push(other.to_string()),
    }
}

/// Non-blank sentences by Unicode sentence boundaries
pub fn split_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whitespace-separated words grouped into chunks of at most `max_words`
pub fn word_chunks(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}

/// Element-wise mean of equally sized vectors
pub fn average(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let mut sum = vec![0.0f32; first.len()];
    for vector in vectors {
        for (acc, value) in sum.iter_mut().zip(vector) {
            *acc += value;
        }
    }
    let count = vectors.len() as f32;
    Some(sum.into_iter().map(|v| v / count).collect())
}

/// Builds corpus documents and their embeddings
pub struct CorpusBuilder {
    embeddings: Arc<EmbeddingManager>,
}

impl CorpusBuilder {
    pub fn new(embeddings: Arc<EmbeddingManager>) -> Self {
        Self { embeddings }
    }

    /// Read `*.txt` from `dataset_dir` and `*.json` from `details_dir`, then
    /// embed every document
    pub async fn build(&self, dataset_dir: &Path, details_dir: &Path) -> Result<Vec<RagDocument>> {
        let mut documents = Vec::new();

        for path in list_files(dataset_dir, "txt")? {
            let bytes = std::fs::read(&path).context(format!("Failed to read {}", path.display()))?;
            documents.push(RagDocument::new(
                file_name(&path),
                DocumentSource::Txt,
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        for path in list_files(details_dir, "json")? {
            let content = match read_json(&path) {
                Ok(value) => flatten_json_strings(&value).join("\n"),
                Err(e) => {
                    warn!("Error processing {}: {e}", path.display());
                    String::new()
                }
            };
            documents.push(RagDocument::new(file_name(&path), DocumentSource::Json, content));
        }

        info!("Loaded {} documents, computing embeddings", documents.len());
        for document in &mut documents {
            self.embed_document(document).await;
        }
        Ok(documents)
    }

    /// Attach the document and sentence embeddings.
    ///
    /// A document whose embedding fails entirely is left without any
    /// embeddings; failed sentences are dropped.
    pub async fn embed_document(&self, document: &mut RagDocument) {
        let Some(embedding) = self.document_embedding(&document.content).await else {
            warn!("Could not compute embedding for document {}", document.doc_id);
            return;
        };
        document.embedding = Some(embedding);

        let sentences = split_sentences(&document.content);
        if sentences.is_empty() {
            return;
        }
        match self.embeddings.embed(sentences.clone()).await {
            Ok(vectors) => {
                document.sentence_embeddings = sentences
                    .into_iter()
                    .zip(vectors)
                    .filter_map(|(sentence, vector)| {
                        vector.map(|embedding| SentenceEmbedding {
                            sentence,
                            embedding,
                        })
                    })
                    .collect();
            }
            Err(e) => warn!("Sentence embeddings failed for {}: {e}", document.doc_id),
        }
        debug!(
            "Embedded {} with {} sentences",
            document.doc_id,
            document.sentence_embeddings.len()
        );
    }

    /// Mean of the embeddings of the document's word chunks
    pub async fn document_embedding(&self, text: &str) -> Option<Vec<f32>> {
        let chunks = word_chunks(text, CHUNK_WORDS);
        if chunks.is_empty() {
            return None;
        }
        match self.embeddings.embed(chunks).await {
            Ok(vectors) => average(&vectors.into_iter().flatten().collect::<Vec<_>>()),
            Err(e) => {
                warn!("Document embedding failed: {e}");
                None
            }
        }
    }
}

fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        warn!("Directory {} does not exist, skipping", dir.display());
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).context(format!("Failed to read {}", dir.display()))? {
        let path = entry.context("Failed to read directory entry")?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}
