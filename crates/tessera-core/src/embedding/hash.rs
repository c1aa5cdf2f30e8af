//! Deterministic hashing embedder.
//!
//! Each lower-cased, whitespace-separated word is hashed with xxHash64 into
//! one of `dimension` buckets; the bucket counts are then L2-normalized.
//! Texts sharing words get similar vectors, so this captures keyword overlap
//! only. It needs no model files, which makes it the fallback for the CLI
//! and the provider used in tests and benchmarks.

use super::traits::{EmbedPurpose, EmbeddingProvider};
use crate::error::EmbeddingError;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Bag-of-words hashing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Creates an embedder producing `dimension`-length vectors.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::Provider` if `dimension` is 0.
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::Provider(
                "hash embedder dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    /// Embeds a single text.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        for word in text.to_lowercase().split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(word.as_bytes());
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            embedding[bucket] += 1.0;
        }

        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        embedding
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "simple-hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(
        &self,
        texts: &[String],
        _purpose: EmbedPurpose,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
