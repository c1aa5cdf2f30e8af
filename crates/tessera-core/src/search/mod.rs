//! Hybrid retrieval combining keyword and semantic scoring.
//!
//! This module implements a passage retrieval system that combines:
//! - **Keyword search** (BM25 over script-aware tokens)
//! - **Semantic search** (exact cosine similarity over embeddings)
//! - **Reciprocal Rank Fusion** (RRF) to merge rankings
//!
//! # Architecture
//!
//! - `types`: Core types (Chunk, DocumentMetadata, SearchMode, SearchResult, stats)
//! - `engine`: RetrievalIndex owning the chunk store and both sub-indexes
//! - `tokenizer`: Lower-casing word tokenizer with Hebrew support
//! - `keyword`: BM25 index with explicit statistics refresh
//! - `vector`: Linear-scan cosine similarity index
//! - `fusion`: RRF, ranking order and lexical normalization
//!
//! # Usage
//!
//! ```
//! use tessera_core::chunking::TextChunk;
//! use tessera_core::config::IndexConfig;
//! use tessera_core::embedding::HashEmbedder;
//! use tessera_core::search::{DocumentMetadata, RetrievalIndex};
//!
//! let mut index = RetrievalIndex::new(HashEmbedder::new(128)?, IndexConfig::default())?;
//! index.add_document(
//!     "a",
//!     vec![TextChunk::standalone(0, "The quick brown fox")],
//!     DocumentMetadata::default(),
//! )?;
//! index.add_document(
//!     "b",
//!     vec![TextChunk::standalone(0, "Python programming basics")],
//!     DocumentMetadata::default(),
//! )?;
//!
//! let results = index.search("fox", 10, None, None)?;
//! assert_eq!(results[0].chunk.doc_id, "a");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Algorithm Details
//!
//! **Keyword Search (BM25)**:
//! - Okapi BM25 with k1=1.5, b=0.75 and a non-negative IDF
//! - Only chunks sharing a term with the query are scored
//!
//! **Semantic Search**:
//! - Cosine similarity against every candidate, zero-norm vectors score 0
//!
//! **Reciprocal Rank Fusion (RRF)**:
//! - Formula: `score = Σ 1 / (k + rank + 1)` with 0-based ranks and k=60
//! - Merges rankings without score normalization

pub mod types;

mod engine;
pub mod fusion;
pub mod keyword;
pub mod tokenizer;
pub mod vector;

use crate::embedding::EmbeddingProvider;
use std::sync::{Arc, RwLock};

pub use engine::RetrievalIndex;
pub use types::{
    Chunk, DocumentMetadata, DocumentSummary, IndexStats, KeywordStats, Position, SearchMode,
    SearchRequest, SearchResult, VectorStats,
};

/// A retrieval index shared between threads: one writer or many readers.
pub type SharedRetrievalIndex<E> = Arc<RwLock<RetrievalIndex<E>>>;

impl<E: EmbeddingProvider> RetrievalIndex<E> {
    /// Wrap the index for sharing across threads.
    pub fn into_shared(self) -> SharedRetrievalIndex<E> {
        Arc::new(RwLock::new(self))
    }
}
