//! # Tessera Core
//!
//! Hybrid passage retrieval: documents are split into overlapping chunks,
//! indexed twice (BM25 over script-aware tokens and cosine similarity over
//! embeddings) and queried through one façade that fuses both rankings with
//! Reciprocal Rank Fusion.
//!
//! The crate computes no embeddings itself; callers supply an
//! [`EmbeddingProvider`](embedding::EmbeddingProvider).
//!
//! ## Modules
//!
//! - [`search`] - Retrieval index, BM25, vector scan, fusion, tokenizer
//! - [`chunking`] - Boundary-aware sliding window chunker
//! - [`embedding`] - Embedding provider trait and the hashing fallback
//! - [`config`] - Production configuration constants and `IndexConfig`
//! - [`error`] - Error types for chunking, embedding and the index

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod error;
pub mod search;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{ChunkingError, EmbeddingError, RetrievalError};
