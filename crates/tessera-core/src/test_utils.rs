//! Test utilities for tessera-core.
//!
//! Deterministic embedding providers for unit tests. Only compiled when
//! running tests.

use crate::embedding::{EmbedPurpose, EmbeddingProvider};
use crate::error::EmbeddingError;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a [`MockEmbedder`] answers `embed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Keyword vectors as documented on [`MockEmbedder`]
    Normal,
    /// Always `EmbeddingError::Provider`
    Fail,
    /// `EmbeddingError::Provider` for queries only, documents embed normally
    FailQueries,
    /// Vectors one component longer than declared
    WrongDimension,
    /// One vector fewer than texts sent
    DropLast,
}

/// Keyword-axis embedder.
///
/// Axis `i` counts occurrences of keyword `i` (case-insensitive substring),
/// so texts mentioning the same keywords point the same way and texts with
/// none of them map to the zero vector. Every `embed` call is counted.
pub struct MockEmbedder {
    keywords: Vec<String>,
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            behavior: MockBehavior::Normal,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Number of `embed` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .map(|keyword| text.matches(keyword.as_str()).count() as f32)
            .collect()
    }
}

impl EmbeddingProvider for MockEmbedder {
    fn name(&self) -> &str {
        "mock-keywords"
    }

    fn dimension(&self) -> usize {
        self.keywords.len()
    }

    fn embed(
        &self,
        texts: &[String],
        purpose: EmbedPurpose,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| self.vector_for(t)).collect();
        match self.behavior {
            MockBehavior::Normal => {}
            MockBehavior::Fail => {
                return Err(EmbeddingError::Provider("mock provider offline".to_string()))
            }
            MockBehavior::FailQueries if purpose == EmbedPurpose::Query => {
                return Err(EmbeddingError::Provider("mock query endpoint offline".to_string()))
            }
            MockBehavior::FailQueries => {}
            MockBehavior::WrongDimension => {
                for v in &mut vectors {
                    v.push(0.0);
                }
            }
            MockBehavior::DropLast => {
                vectors.pop();
            }
        }
        Ok(vectors)
    }
}
