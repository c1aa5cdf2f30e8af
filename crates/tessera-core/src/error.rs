//! Error types for tessera-core.
//!
//! This module defines the errors surfaced by the retrieval index and the
//! components it drives: chunking configuration, the external embedding
//! capability, and caller input validation.
//!
//! Internal invariant violations (a position map pointing outside the dense
//! store, sub-indexes of different lengths) are not represented here. They
//! indicate a bug in compaction and panic with an `index inconsistency`
//! message instead of returning an error.

use thiserror::Error;

/// Errors that can occur while talking to the embedding capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    /// The provider failed to produce embeddings
    #[error("Embedding provider failed: {0}")]
    Provider(String),
    /// Vector dimension mismatch (expected vs actual)
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension declared by the provider / index
        expected: usize,
        /// Dimension of the vector received
        actual: usize,
    },
    /// Model weights, config or tokenizer could not be loaded
    #[error("Model load failed: {0}")]
    ModelLoad(String),
    /// Text could not be encoded into model tokens
    #[error("Tokenization failed: {0}")]
    Tokenization(String),
    /// Forward pass or pooling failed
    #[error("Inference failed: {0}")]
    Inference(String),
    /// Provider returned a different number of vectors than texts sent
    #[error("Embedding count mismatch: sent {expected} texts, got {actual} vectors")]
    CountMismatch {
        /// Number of texts in the batch
        expected: usize,
        /// Number of vectors returned
        actual: usize,
    },
}

/// Errors that can occur during text chunking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkingError {
    /// Invalid chunking configuration
    #[error("Invalid chunking config: {0}")]
    InvalidConfig(String),
}

/// Errors returned by the retrieval index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrievalError {
    /// Empty or malformed query / chunk text where a value is required
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The embedding capability failed or returned unusable vectors
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),
    /// Document id has no chunks in the index
    #[error("Unknown document: {0}")]
    UnknownDocument(String),
    /// Raw text could not be chunked
    #[error("Chunking failed: {0}")]
    Chunking(#[from] ChunkingError),
}
