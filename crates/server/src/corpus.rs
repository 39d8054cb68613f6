//! The prepared retrieval corpus

use repograph_core::error::{Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Where a corpus document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    /// A crawled repository document (code)
    Txt,
    /// A project detail record
    Json,
}

/// One sentence of a document together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceEmbedding {
    pub sentence: String,
    pub embedding: Vec<f32>,
}

/// A document of the retrieval corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagDocument {
    /// File name the document was read from
    pub doc_id: String,
    pub source: DocumentSource,
    pub content: String,
    /// Whole-document embedding; absent when embedding failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub sentence_embeddings: Vec<SentenceEmbedding>,
}

impl RagDocument {
    pub fn new(doc_id: impl Into<String>, source: DocumentSource, content: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            source,
            content: content.into(),
            embedding: None,
            sentence_embeddings: Vec::new(),
        }
    }

    /// Whether search can score this document
    pub fn is_searchable(&self) -> bool {
        !self.sentence_embeddings.is_empty()
    }
}

/// Load a corpus written by [`save_corpus`]
pub fn load_corpus(path: &Path) -> Result<Vec<RagDocument>> {
    let text = std::fs::read_to_string(path)
        .context(format!("Failed to read corpus {}", path.display()))?;
    let documents: Vec<RagDocument> = serde_json::from_str(&text)
        .context(format!("Invalid corpus file {}", path.display()))?;
    info!(
        "Loaded {} corpus documents from {}",
        documents.len(),
        path.display()
    );
    Ok(documents)
}

pub fn save_corpus(path: &Path, documents: &[RagDocument]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(documents)?;
    std::fs::write(path, text).context(format!("Failed to write corpus {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rag.json");

        let mut doc = RagDocument::new("demo.txt", DocumentSource::Txt, "Hello there.");
        doc.embedding = Some(vec![0.5, 0.25]);
        doc.sentence_embeddings.push(SentenceEmbedding {
            sentence: "Hello there.".to_string(),
            embedding: vec![0.5, 0.25],
        });
        let unembedded = RagDocument::new("demo.json", DocumentSource::Json, "");

        save_corpus(&path, &[doc.clone(), unembedded.clone()]).unwrap();
        let loaded = load_corpus(&path).unwrap();
        assert_eq!(loaded, vec![doc, unembedded]);
        assert!(loaded[0].is_searchable());
        assert!(!loaded[1].is_searchable());
    }

    #[test]
    fn test_source_tags() {
        let doc: RagDocument =
            serde_json::from_str(r#"{"doc_id":"a.json","source":"json","content":"x"}"#).unwrap();
        assert_eq!(doc.source, DocumentSource::Json);
        assert_eq!(doc.embedding, None);
    }
}
