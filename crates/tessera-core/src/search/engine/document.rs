//! Document-level inspection of the index.

use super::RetrievalIndex;
use crate::embedding::EmbeddingProvider;
use crate::search::types::{Chunk, DocumentSummary};
use std::sync::Arc;
use tracing::info;

impl<E: EmbeddingProvider> RetrievalIndex<E> {
    /// Chunks of `doc_id` in position order. Empty for unknown ids.
    pub fn document_chunks(&self, doc_id: &str) -> Vec<&Chunk> {
        self.doc_positions
            .get(doc_id)
            .map(|positions| positions.iter().map(|&p| self.chunk_at(p)).collect())
            .unwrap_or_default()
    }

    /// Every indexed document, in the order it was first added.
    pub fn list_documents(&self) -> Vec<DocumentSummary> {
        self.doc_order
            .iter()
            .filter_map(|doc_id| {
                let positions = self.doc_positions.get(doc_id)?;
                let first = self.chunk_at(*positions.first()?);
                Some(DocumentSummary {
                    doc_id: doc_id.clone(),
                    metadata: Arc::clone(&first.metadata),
                    chunk_count: positions.len(),
                })
            })
            .collect()
    }

    pub fn contains_document(&self, doc_id: &str) -> bool {
        self.doc_positions.contains_key(doc_id)
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of indexed documents.
    pub fn document_count(&self) -> usize {
        self.doc_positions.len()
    }

    /// Remove everything. The provider and configuration are kept.
    pub fn clear(&mut self) {
        let chunks = self.chunks.len();
        self.chunks.clear();
        self.doc_positions.clear();
        self.doc_order.clear();
        self.keyword_index.clear();
        self.vector_index.clear();
        info!(chunks, "Cleared retrieval index");
    }
}
