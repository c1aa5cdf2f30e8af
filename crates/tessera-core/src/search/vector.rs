// Exact cosine-similarity scan over a parallel array of embeddings

use super::types::{compact_in_place, Position, VectorStats};
use crate::embedding::validate_dimension;
use crate::error::EmbeddingError;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// Cosine similarity of two vectors.
///
/// Returns `dot(a, b) / (‖a‖·‖b‖)`, and exactly `0.0` when either norm is
/// zero. Extra components of the longer slice are ignored.
///
/// # Examples
///
/// ```
/// use tessera_core::search::vector::cosine_similarity;
///
/// assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    similarity_with_norms(a, norm(a), b, norm(b))
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn similarity_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    dot / (norm_a * norm_b)
}

/// Semantic index holding one embedding per position.
///
/// Search is an exact linear scan, so every candidate receives a score,
/// including negative and zero similarities. Norms are cached at insert time.
///
/// Embeddings are stored as `Box<[f32]>` so the allocation is exactly the
/// vector length.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    vectors: Vec<Box<[f32]>>,
    norms: Vec<f32>,
    dimension: usize,
}

impl VectorIndex {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: Vec::new(),
            norms: Vec::new(),
            dimension,
        }
    }

    /// Append an embedding and return its position.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::DimensionMismatch` if the vector length does
    /// not match the index dimension.
    pub fn insert(&mut self, embedding: Vec<f32>) -> Result<Position, EmbeddingError> {
        validate_dimension(self.dimension, embedding.len())?;
        self.norms.push(norm(&embedding));
        self.vectors.push(embedding.into_boxed_slice());
        Ok(self.vectors.len() - 1)
    }

    /// Score `query` against every stored vector, or only `candidates`.
    ///
    /// Out-of-range candidates are skipped.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::DimensionMismatch` if the query length does
    /// not match the index dimension.
    #[instrument(skip_all, fields(index_size = self.vectors.len()))]
    pub fn score(
        &self,
        query: &[f32],
        candidates: Option<&[Position]>,
    ) -> Result<HashMap<Position, f32>, EmbeddingError> {
        validate_dimension(self.dimension, query.len())?;
        let query_norm = norm(query);

        let score_one = |position: Position| {
            let vector = self.vectors.get(position)?;
            let similarity =
                similarity_with_norms(query, query_norm, vector, self.norms[position]);
            Some((position, similarity))
        };

        let scores = match candidates {
            Some(candidates) => candidates.iter().filter_map(|&p| score_one(p)).collect(),
            None => (0..self.vectors.len()).filter_map(score_one).collect(),
        };
        Ok(scores)
    }

    /// Remove the vectors at `positions`, keeping the order of the rest.
    pub fn remove_at(&mut self, positions: &HashSet<Position>) {
        if positions.is_empty() {
            return;
        }
        compact_in_place(&mut self.vectors, positions);
        compact_in_place(&mut self.norms, positions);
    }

    /// Stored vector at `position`.
    pub fn get(&self, position: Position) -> Option<&[f32]> {
        self.vectors.get(position).map(|v| &v[..])
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn stats(&self) -> VectorStats {
        VectorStats {
            vectors: self.vectors.len(),
            dimension: self.dimension,
            zero_norm_vectors: self.norms.iter().filter(|&&n| n == 0.0).count(),
        }
    }

    pub fn clear(&mut self) {
        self.vectors.clear();
        self.norms.clear();
    }
}
