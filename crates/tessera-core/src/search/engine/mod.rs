//! Retrieval index combining keyword (BM25) and semantic (cosine) scoring.
//!
//! This module provides the [`RetrievalIndex`] which owns:
//! - the chunk store, one [`Chunk`] per dense position
//! - the document-to-positions map
//! - a [`KeywordIndex`] and a [`VectorIndex`] addressed by the same positions
//!
//! # Positions
//!
//! Live chunks always occupy positions `0..len`. Every mutation keeps the
//! three stores the same length and the document map a partition of that
//! range; removal compacts all of them with one plan (see `compaction`).
//!
//! # Search modes
//!
//! - [`SearchMode::Hybrid`]: RRF over the lexical and semantic rankings
//! - [`SearchMode::Lexical`]: BM25 scores divided by the best score
//! - [`SearchMode::Semantic`]: raw cosine similarity

mod compaction;
mod document;


use super::fusion::{fuse, normalize_lexical, ranking};
use super::keyword::KeywordIndex;
use super::tokenizer::tokenize;
use super::types::{
    Chunk, DocumentMetadata, IndexStats, Position, SearchMode, SearchRequest, SearchResult,
};
use super::vector::VectorIndex;
use crate::chunking::{ChunkingStrategy, TextChunk, WindowChunker};
use crate::config::IndexConfig;
use crate::embedding::{validate_dimension, EmbedPurpose, EmbeddingProvider};
use crate::error::{EmbeddingError, RetrievalError};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Hybrid passage retrieval index.
///
/// Generic over the embedding capability so deployments can plug in any
/// [`EmbeddingProvider`] (a local model, an API client, or
/// [`HashEmbedder`](crate::embedding::HashEmbedder)).
///
/// # Concurrency
///
/// Queries take `&self`, mutations take `&mut self`. Wrap the index in a
/// [`SharedRetrievalIndex`](crate::search::SharedRetrievalIndex) to share it
/// between threads.
///
/// # Example
///
/// ```
/// use tessera_core::embedding::HashEmbedder;
/// use tessera_core::search::{DocumentMetadata, RetrievalIndex, SearchMode};
/// use tessera_core::config::IndexConfig;
///
/// let mut index = RetrievalIndex::new(HashEmbedder::new(256)?, IndexConfig::default())?;
/// index.index_text("notes", "The quick brown fox.", DocumentMetadata::default())?;
///
/// let results = index.search("fox", 5, None, Some(SearchMode::Lexical))?;
/// assert_eq!(results[0].chunk.doc_id, "notes");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RetrievalIndex<E: EmbeddingProvider> {
    /// External embedding capability
    pub(crate) provider: E,
    /// Validated configuration
    pub(crate) config: IndexConfig,
    /// Chunker used by `index_text`
    pub(crate) chunker: WindowChunker,
    /// Chunk store, indexed by position
    pub(crate) chunks: Vec<Chunk>,
    /// Document id -> ascending positions of its chunks
    pub(crate) doc_positions: HashMap<String, Vec<Position>>,
    /// Document ids in first-insertion order
    pub(crate) doc_order: Vec<String>,
    /// BM25 token statistics, indexed by position
    pub(crate) keyword_index: KeywordIndex,
    /// Embeddings, indexed by position
    pub(crate) vector_index: VectorIndex,
}

impl<E: EmbeddingProvider> RetrievalIndex<E> {
    /// Create an empty index.
    ///
    /// # Errors
    /// - `RetrievalError::Chunking` / `InvalidInput` if `config` is invalid
    /// - `RetrievalError::InvalidInput` if the provider declares dimension 0
    pub fn new(provider: E, config: IndexConfig) -> Result<Self, RetrievalError> {
        config.validate()?;
        let dimension = provider.dimension();
        if dimension == 0 {
            return Err(RetrievalError::InvalidInput(format!(
                "embedding provider '{}' declares dimension 0",
                provider.name()
            )));
        }

        info!(
            provider = provider.name(),
            dimension,
            mode = %config.default_mode,
            "Created retrieval index"
        );

        Ok(Self {
            chunker: WindowChunker::new(config.chunking)?,
            keyword_index: KeywordIndex::new(config.bm25),
            vector_index: VectorIndex::new(dimension),
            chunks: Vec::new(),
            doc_positions: HashMap::new(),
            doc_order: Vec::new(),
            provider,
            config,
        })
    }

    /// The embedding provider in use.
    pub fn provider(&self) -> &E {
        &self.provider
    }

    /// The configuration the index was created with.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Add pre-chunked text for a document.
    ///
    /// All chunk texts are embedded in one batch before anything is stored,
    /// so a failure leaves the index untouched. Adding chunks for an id that
    /// already exists appends to that document.
    ///
    /// # Returns
    /// The number of chunks added (0 for an empty chunk list).
    ///
    /// # Errors
    /// - `RetrievalError::InvalidInput` for an empty document id or a chunk
    ///   whose text is blank
    /// - `RetrievalError::EmbeddingUnavailable` if the provider fails or
    ///   returns the wrong number or length of vectors
    #[instrument(skip_all, fields(doc_id = %doc_id, chunks = chunks.len()))]
    pub fn add_document(
        &mut self,
        doc_id: &str,
        chunks: Vec<TextChunk>,
        metadata: DocumentMetadata,
    ) -> Result<usize, RetrievalError> {
        if chunks.is_empty() {
            debug!("No chunks to add");
            return Ok(0);
        }
        if doc_id.trim().is_empty() {
            return Err(RetrievalError::InvalidInput(
                "document id must not be empty".to_string(),
            ));
        }
        if let Some(blank) = chunks.iter().find(|c| c.text.trim().is_empty()) {
            return Err(RetrievalError::InvalidInput(format!(
                "chunk {} of '{}' has no text",
                blank.index, doc_id
            )));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embed_checked(&texts, EmbedPurpose::Document)?;

        let metadata = Arc::new(metadata);
        let first_position = self.chunks.len();
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            self.vector_index.insert(embedding)?;
            self.keyword_index.insert(tokenize(&chunk.text));
            self.chunks.push(Chunk {
                doc_id: doc_id.to_string(),
                chunk_index: chunk.index,
                text: chunk.text,
                start_char: chunk.start_char,
                end_char: chunk.end_char,
                metadata: Arc::clone(&metadata),
            });
        }
        self.keyword_index.refresh();

        let added = self.chunks.len() - first_position;
        if !self.doc_positions.contains_key(doc_id) {
            self.doc_order.push(doc_id.to_string());
        }
        self.doc_positions
            .entry(doc_id.to_string())
            .or_default()
            .extend(first_position..self.chunks.len());

        self.debug_assert_consistent();
        info!(added, total_chunks = self.chunks.len(), "Added document chunks");
        Ok(added)
    }

    /// Chunk raw text with the configured window chunker, then add it.
    ///
    /// Text that yields no chunks (empty or whitespace only) adds nothing.
    pub fn index_text(
        &mut self,
        doc_id: &str,
        text: &str,
        metadata: DocumentMetadata,
    ) -> Result<usize, RetrievalError> {
        let chunks = self.chunker.chunk(text);
        self.add_document(doc_id, chunks, metadata)
    }

    /// Search for the `top_k` best chunks.
    ///
    /// `candidate_doc_ids` restricts scoring to chunks of those documents;
    /// unknown ids contribute nothing and a restriction that matches no
    /// chunks returns an empty list without consulting either sub-index.
    /// `mode` defaults to the configured mode.
    ///
    /// Results are ordered by score descending, ties by ascending position.
    ///
    /// # Errors
    /// - `RetrievalError::InvalidInput` for an empty query
    /// - `RetrievalError::EmbeddingUnavailable` if semantic scoring is
    ///   needed and the provider fails
    #[instrument(skip_all, fields(query_len = query.len(), top_k = top_k))]
    pub fn search(
        &self,
        query: &str,
        top_k: usize,
        candidate_doc_ids: Option<&[&str]>,
        mode: Option<SearchMode>,
    ) -> Result<Vec<SearchResult>, RetrievalError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        if query.trim().is_empty() {
            return Err(RetrievalError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }
        let mode = mode.unwrap_or(self.config.default_mode);

        let candidates = candidate_doc_ids.map(|ids| self.candidate_positions(ids));
        if candidates.as_ref().is_some_and(|c| c.is_empty()) {
            debug!("Candidate restriction matches no chunks");
            return Ok(Vec::new());
        }
        if self.chunks.is_empty() {
            return Ok(Vec::new());
        }
        let candidates = candidates.as_deref();

        let lexical = if mode.uses_lexical() {
            self.keyword_index.score(&tokenize(query), candidates)
        } else {
            HashMap::new()
        };

        let semantic = if mode.uses_semantic() {
            let query_texts = [query.to_string()];
            let mut embeddings = self.embed_checked(&query_texts, EmbedPurpose::Query)?;
            let query_embedding = embeddings.pop().unwrap_or_default();
            self.vector_index.score(&query_embedding, candidates)?
        } else {
            HashMap::new()
        };

        let scores = match mode {
            SearchMode::Hybrid => fuse(&lexical, &semantic),
            SearchMode::Lexical => normalize_lexical(&lexical),
            SearchMode::Semantic => semantic.clone(),
        };

        let mut ranked = ranking(&scores);
        ranked.truncate(top_k);

        debug!(
            %mode,
            lexical_hits = lexical.len(),
            semantic_hits = semantic.len(),
            returned = ranked.len(),
            "Search completed"
        );

        Ok(ranked
            .into_iter()
            .map(|(position, score)| SearchResult {
                position,
                score,
                keyword_score: lexical.get(&position).copied(),
                vector_score: semantic.get(&position).copied(),
                chunk: self.chunk_at(position).clone(),
            })
            .collect())
    }

    /// [`search`](Self::search) driven by a [`SearchRequest`].
    pub fn search_with(&self, request: &SearchRequest) -> Result<Vec<SearchResult>, RetrievalError> {
        let candidates: Option<Vec<&str>> = request
            .candidates
            .as_ref()
            .map(|ids| ids.iter().map(String::as_str).collect());
        self.search(
            &request.query,
            request.top_k,
            candidates.as_deref(),
            request.mode,
        )
    }

    /// Diagnostic snapshot of the index.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_chunks: self.chunks.len(),
            total_documents: self.doc_positions.len(),
            embedding_dimension: self.vector_index.dimension(),
            embedding_provider: self.provider.name().to_string(),
            default_mode: self.config.default_mode,
            keyword: self.keyword_index.stats(),
            vector: self.vector_index.stats(),
        }
    }

    /// Embed `texts` and validate the provider's output against the index.
    fn embed_checked(
        &self,
        texts: &[String],
        purpose: EmbedPurpose,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let embeddings = self.provider.embed(texts, purpose).map_err(|e| {
            warn!(provider = self.provider.name(), "Embedding failed: {}", e);
            e
        })?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        let dimension = self.vector_index.dimension();
        for embedding in &embeddings {
            validate_dimension(dimension, embedding.len())?;
        }
        Ok(embeddings)
    }

    /// Union of the positions of `doc_ids`, ascending and deduplicated.
    fn candidate_positions(&self, doc_ids: &[&str]) -> Vec<Position> {
        let positions: BTreeSet<Position> = doc_ids
            .iter()
            .filter_map(|id| self.doc_positions.get(*id))
            .flatten()
            .copied()
            .collect();
        positions.into_iter().collect()
    }

    /// Chunk at a position taken from the document map or a score map.
    ///
    /// # Panics
    /// If the position is outside the chunk store.
    pub(crate) fn chunk_at(&self, position: Position) -> &Chunk {
        match self.chunks.get(position) {
            Some(chunk) => chunk,
            None => panic!(
                "index inconsistency: position {} outside chunk store of {}",
                position,
                self.chunks.len()
            ),
        }
    }

    /// Verify that all stores agree.
    ///
    /// Checks that the chunk store and both sub-indexes have the same length,
    /// that the document map partitions `0..len` in ascending order, and
    /// that every chunk is listed under its own document.
    ///
    /// # Panics
    /// With an `index inconsistency` message on the first violation found.
    pub fn assert_consistent(&self) {
        let len = self.chunks.len();
        if self.keyword_index.len() != len || self.vector_index.len() != len {
            panic!(
                "index inconsistency: {} chunks, {} keyword entries, {} vectors",
                len,
                self.keyword_index.len(),
                self.vector_index.len()
            );
        }
        if self.doc_order.len() != self.doc_positions.len() {
            panic!(
                "index inconsistency: {} ordered documents, {} mapped documents",
                self.doc_order.len(),
                self.doc_positions.len()
            );
        }

        let mut seen = vec![false; len];
        for (doc_id, positions) in &self.doc_positions {
            if positions.is_empty() || positions.windows(2).any(|w| w[0] >= w[1]) {
                panic!(
                    "index inconsistency: positions of '{}' are empty or unordered",
                    doc_id
                );
            }
            for &position in positions {
                match seen.get_mut(position) {
                    Some(slot) if !*slot => *slot = true,
                    Some(_) => panic!(
                        "index inconsistency: position {} mapped twice ('{}')",
                        position, doc_id
                    ),
                    None => panic!(
                        "index inconsistency: '{}' maps to position {} of {}",
                        doc_id, position, len
                    ),
                }
                if self.chunks[position].doc_id != *doc_id {
                    panic!(
                        "index inconsistency: position {} belongs to '{}', mapped under '{}'",
                        position, self.chunks[position].doc_id, doc_id
                    );
                }
            }
        }
        if let Some(orphan) = seen.iter().position(|&s| !s) {
            panic!("index inconsistency: position {} has no document", orphan);
        }
    }

    fn debug_assert_consistent(&self) {
        if cfg!(debug_assertions) {
            self.assert_consistent();
        }
    }
}
