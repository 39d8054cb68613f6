//! Error types for the embeddings module

use std::fmt;

/// Errors that can occur during embedding operations
#[derive(Debug)]
pub enum EmbeddingError {
    /// Provider could not be initialised
    ModelLoadError(String),

    /// Inference failed
    InferenceError(String),

    /// Returned vector has the wrong length
    DimensionMismatch { expected: usize, actual: usize },
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Failed to initialise provider: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference failed: {msg}"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

impl std::error::Error for EmbeddingError {}

impl From<EmbeddingError> for repograph_core::error::Error {
    fn from(err: EmbeddingError) -> Self {
        repograph_core::error::Error::Embedding(err.to_string())
    }
}
