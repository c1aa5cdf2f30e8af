//! Traits for embedding operations.
//!
//! The retrieval index never computes embeddings itself. It talks to an
//! [`EmbeddingProvider`], so a deployment can plug in a local model, a remote
//! API or the deterministic [`HashEmbedder`](super::HashEmbedder) without
//! changing the index.

use crate::error::EmbeddingError;
use std::sync::Arc;

/// Whether texts are being embedded for storage or for lookup.
///
/// Asymmetric models (e.g. E5 with `passage:` / `query:` prefixes) embed the
/// two differently; symmetric providers may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedPurpose {
    /// Chunks being indexed
    Document,
    /// A search query
    Query,
}

/// Trait for text embedding providers.
///
/// # Contract
///
/// `embed` returns exactly one vector per input text, in input order, each of
/// length [`dimension`](Self::dimension). The index validates both and treats
/// a violation as [`EmbeddingError::CountMismatch`] or
/// [`EmbeddingError::DimensionMismatch`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so an index can be shared behind a
/// lock across threads.
///
/// # Examples
///
/// ```
/// use tessera_core::embedding::{EmbedPurpose, EmbeddingProvider, HashEmbedder};
///
/// let provider = HashEmbedder::new(64)?;
/// let vectors = provider.embed(&["hello world".to_string()], EmbedPurpose::Query)?;
/// assert_eq!(vectors[0].len(), provider.dimension());
/// # Ok::<(), tessera_core::EmbeddingError>(())
/// ```
pub trait EmbeddingProvider: Send + Sync {
    /// Human-readable provider name, reported in index statistics.
    fn name(&self) -> &str;

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Embeds a batch of texts.
    fn embed(
        &self,
        texts: &[String],
        purpose: EmbedPurpose,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

impl<E: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(
        &self,
        texts: &[String],
        purpose: EmbedPurpose,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed(texts, purpose)
    }
}

impl<E: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(
        &self,
        texts: &[String],
        purpose: EmbedPurpose,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed(texts, purpose)
    }
}

/// Validates that an embedding has the expected dimension.
///
/// # Examples
///
/// ```
/// use tessera_core::embedding::validate_dimension;
///
/// assert!(validate_dimension(3, 3).is_ok());
/// assert!(validate_dimension(5, 3).is_err());
/// ```
pub fn validate_dimension(expected: usize, actual: usize) -> Result<(), EmbeddingError> {
    if actual == expected {
        Ok(())
    } else {
        Err(EmbeddingError::DimensionMismatch { expected, actual })
    }
}
