//! Sentence-level cosine search over the corpus

use crate::corpus::{DocumentSource, RagDocument};
use repograph_core::config::ServerConfig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Search knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Documents returned at most
    pub top_k: usize,
    /// Minimum best-sentence score for a document to be kept
    pub threshold: f64,
    /// Sentences reported per document
    pub top_n_sentences: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 2,
            threshold: 0.5,
            top_n_sentences: 3,
        }
    }
}

impl From<&ServerConfig> for SearchParams {
    fn from(config: &ServerConfig) -> Self {
        Self {
            top_k: config.top_k,
            threshold: f64::from(config.threshold),
            top_n_sentences: config.top_n_sentences,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Code,
    ProjectDetails,
}

impl From<DocumentSource> for DocumentKind {
    fn from(source: DocumentSource) -> Self {
        match source {
            DocumentSource::Txt => DocumentKind::Code,
            DocumentSource::Json => DocumentKind::ProjectDetails,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSentence {
    pub score: f64,
    pub sentence: String,
}

/// One retrieved document, in the shape the prompt embeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub document_name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub cosine_sentence_score: Vec<ScoredSentence>,
    pub full_document_content: String,
}

impl RetrievalResult {
    fn best_score(&self) -> f64 {
        self.cosine_sentence_score
            .first()
            .map_or(f64::NEG_INFINITY, |s| s.score)
    }
}

/// `dot / (|a||b| + 1e-8)`; vectors of different length are compared over
/// their common prefix
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt() + 1e-8)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Rank documents by their best matching sentence.
///
/// A document is kept when its best sentence scores at least the threshold;
/// documents without sentence embeddings are ignored.
pub fn search(
    documents: &[RagDocument],
    query_embedding: &[f32],
    params: &SearchParams,
) -> Vec<RetrievalResult> {
    let mut results: Vec<RetrievalResult> = documents
        .iter()
        .filter(|doc| doc.is_searchable())
        .filter_map(|doc| {
            let mut scored: Vec<(f64, &str)> = doc
                .sentence_embeddings
                .iter()
                .map(|s| (cosine_similarity(query_embedding, &s.embedding), s.sentence.as_str()))
                .collect();
            scored.sort_by(|a, b| descending(a.0, b.0));

            let best = scored.first()?.0;
            if best < params.threshold {
                return None;
            }

            Some(RetrievalResult {
                document_name: doc.doc_id.clone(),
                kind: doc.source.into(),
                cosine_sentence_score: scored
                    .into_iter()
                    .take(params.top_n_sentences)
                    .map(|(score, sentence)| ScoredSentence {
                        score: round4(score),
                        sentence: sentence.to_string(),
                    })
                    .collect(),
                full_document_content: doc.content.clone(),
            })
        })
        .collect();

    results.sort_by(|a, b| descending(a.best_score(), b.best_score()));
    results.truncate(params.top_k);
    results
}
