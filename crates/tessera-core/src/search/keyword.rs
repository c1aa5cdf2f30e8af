//! BM25 keyword scoring for exact term matching.
//!
//! This module wraps the [`bm25`](https://crates.io/crates/bm25) crate. BM25
//! (Best Matching 25) scores a chunk by how often the query terms occur in
//! it, weighted by how rare those terms are across the corpus and normalized
//! by chunk length:
//!
//! ```text
//! score(q, d) = Σ idf(t) · tf(t,d)·(k1+1) / (tf(t,d) + k1·(1 − b + b·|d|/avgdl))
//! idf(t)      = ln(1 + (N − df(t) + 0.5) / (df(t) + 0.5))
//! ```
//!
//! The IDF variant never goes negative, so a term that appears in half of a
//! tiny corpus still counts as a match.
//!
//! # Statistics refresh
//!
//! The `bm25` engine has no delete, and its IDF and average length are
//! corpus-wide. [`KeywordIndex`] therefore keeps the token lists itself,
//! addressed by dense position, and [`refresh`](KeywordIndex::refresh)
//! rebuilds the engine from them. [`insert`](KeywordIndex::insert) only
//! appends and marks the engine stale; call `refresh` once after a batch of
//! inserts and before the next query.
//!
//! # Usage
//!
//! ```
//! use tessera_core::search::keyword::KeywordIndex;
//! use tessera_core::search::tokenizer::tokenize;
//!
//! let mut index = KeywordIndex::default();
//! index.insert(tokenize("rust programming language"));
//! index.insert(tokenize("python scripting language"));
//! index.refresh();
//!
//! let scores = index.score(&tokenize("rust"), None);
//! assert!(scores.contains_key(&0));
//! assert!(!scores.contains_key(&1));
//! ```

use super::tokenizer::tokenize;
use super::types::{compact_in_place, KeywordStats, Position};
use crate::config::Bm25Params;
use bm25::{Document, SearchEngine, SearchEngineBuilder, Tokenizer};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Adapter running [`tokenize`] inside the `bm25` engine, so indexed chunks
/// and queries keep the Hebrew single-character rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptTokenizer;

impl Tokenizer for ScriptTokenizer {
    fn tokenize(&self, input_text: &str) -> Vec<String> {
        tokenize(input_text)
    }
}

/// BM25 index over tokenized chunks, addressed by dense position.
///
/// # Thread Safety
///
/// Scoring takes `&self` and may run concurrently; mutations take `&mut self`.
#[derive(Default)]
pub struct KeywordIndex {
    params: Bm25Params,
    /// Per-position token lists
    entries: Vec<Vec<String>>,
    /// Engine built by the last refresh; `None` for an empty corpus
    engine: Option<SearchEngine<Position, u32, ScriptTokenizer>>,
    /// Distinct terms at the last refresh
    vocabulary_size: usize,
    /// `true` when entries changed since the last refresh
    stale: bool,
}

impl KeywordIndex {
    /// Creates an empty index with the given BM25 parameters.
    pub fn new(params: Bm25Params) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Appends a tokenized chunk and returns its position.
    ///
    /// Statistics are stale until [`refresh`](Self::refresh) is called.
    pub fn insert(&mut self, tokens: Vec<String>) -> Position {
        self.entries.push(tokens);
        self.stale = true;
        self.entries.len() - 1
    }

    /// Rebuilds the BM25 engine from the stored token lists. O(total tokens).
    #[instrument(skip_all, fields(chunks = self.entries.len()))]
    pub fn refresh(&mut self) {
        self.vocabulary_size = self
            .entries
            .iter()
            .flatten()
            .collect::<HashSet<_>>()
            .len();

        self.engine = if self.entries.is_empty() {
            None
        } else {
            let documents: Vec<Document<Position>> = self
                .entries
                .iter()
                .enumerate()
                .map(|(position, tokens)| Document {
                    id: position,
                    contents: tokens.join(" "),
                })
                .collect();
            let Bm25Params { k1, b } = self.params;
            Some(
                SearchEngineBuilder::<Position, u32, ScriptTokenizer>::with_tokenizer_and_documents(
                    ScriptTokenizer,
                    documents,
                )
                .k1(k1)
                .b(b)
                .build(),
            )
        };
        self.stale = false;

        debug!(vocabulary = self.vocabulary_size, "Rebuilt BM25 engine");
    }

    /// Removes the chunks at `positions`, renumbers the survivors in order,
    /// and refreshes statistics.
    pub fn remove_at(&mut self, positions: &HashSet<Position>) {
        if positions.is_empty() {
            return;
        }
        compact_in_place(&mut self.entries, positions);
        self.refresh();
    }

    /// Scores `query_tokens` against the corpus or the given candidates.
    ///
    /// Only positions with a strictly positive score are returned; a chunk
    /// sharing no term with the query is absent. Empty query or empty corpus
    /// yields an empty map. Out-of-range candidates are ignored. A term
    /// repeated in the query counts once.
    pub fn score(
        &self,
        query_tokens: &[String],
        candidates: Option<&[Position]>,
    ) -> HashMap<Position, f32> {
        debug_assert!(!self.stale, "BM25 statistics queried before refresh");

        let Some(engine) = &self.engine else {
            return HashMap::new();
        };
        if query_tokens.is_empty() {
            return HashMap::new();
        }

        let allowed: Option<HashSet<Position>> =
            candidates.map(|candidates| candidates.iter().copied().collect());

        engine
            .search(&query_tokens.join(" "), self.entries.len())
            .into_iter()
            .map(|result| (result.document.id, result.score))
            .filter(|(position, score)| {
                *score > 0.0 && allowed.as_ref().map_or(true, |a| a.contains(position))
            })
            .collect()
    }

    /// Returns the number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no chunks have been indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if inserts happened since the last refresh.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Returns the BM25 parameters in use.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> KeywordStats {
        let total_tokens: usize = self.entries.iter().map(Vec::len).sum();
        KeywordStats {
            chunks: self.entries.len(),
            total_tokens,
            avg_tokens_per_chunk: if self.entries.is_empty() {
                0.0
            } else {
                total_tokens as f64 / self.entries.len() as f64
            },
            vocabulary_size: self.vocabulary_size,
        }
    }

    /// Drops every chunk and statistic.
    pub fn clear(&mut self) {
        *self = Self::new(self.params);
    }
}
