//! Provider selection with a hashing fallback.
//!
//! A deployment asks for either the deterministic hash provider or a local
//! model. When the model cannot be loaded the factory logs a warning and
//! falls back to [`HashEmbedder`], so indexing still works without model
//! files.

use super::config::E5Config;
use super::hash::HashEmbedder;
use super::model::E5Embedder;
use super::traits::EmbeddingProvider;
use crate::config::DEFAULT_EMBEDDING_DIM;
use crate::error::EmbeddingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// A provider chosen at runtime.
pub type DynEmbeddingProvider = Box<dyn EmbeddingProvider>;

/// Which embedding provider to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Bag-of-words hashing, no model required
    #[default]
    Hash,
    /// Local sentence embedding model
    Model,
}

impl EmbedderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedderKind::Hash => "hash",
            EmbedderKind::Model => "model",
        }
    }
}

impl fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbedderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hash" | "simple-hash" => Ok(EmbedderKind::Hash),
            "model" | "local" | "e5" => Ok(EmbedderKind::Model),
            other => Err(format!(
                "unknown embedder '{}' (expected hash or model)",
                other
            )),
        }
    }
}

/// Everything needed to build a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub kind: EmbedderKind,
    /// Dimension of the hash provider, also used on fallback
    pub hash_dimension: usize,
    /// Directory holding the model files
    pub model_dir: Option<PathBuf>,
    pub model: E5Config,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::default(),
            hash_dimension: DEFAULT_EMBEDDING_DIM,
            model_dir: None,
            model: E5Config::default(),
        }
    }
}

/// Builds the provider described by `settings`.
///
/// A model that is missing or fails to load falls back to the hash provider.
///
/// # Errors
///
/// Returns `EmbeddingError::Provider` if the hash dimension is 0.
pub fn create_provider(
    settings: &ProviderSettings,
) -> Result<DynEmbeddingProvider, EmbeddingError> {
    if settings.kind == EmbedderKind::Model {
        match &settings.model_dir {
            Some(dir) => match E5Embedder::from_dir(dir, settings.model.clone()) {
                Ok(embedder) => {
                    info!("Using local embeddings: {}", settings.model.model_id);
                    return Ok(Box::new(embedder));
                }
                Err(e) => warn!("{}; falling back to simple embeddings", e),
            },
            None => warn!("No model directory configured; falling back to simple embeddings"),
        }
    }

    Ok(Box::new(HashEmbedder::new(settings.hash_dimension)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embedder_kind() {
        assert_eq!("hash".parse::<EmbedderKind>(), Ok(EmbedderKind::Hash));
        assert_eq!("Model".parse::<EmbedderKind>(), Ok(EmbedderKind::Model));
        assert_eq!("e5".parse::<EmbedderKind>(), Ok(EmbedderKind::Model));
        assert!("onnx".parse::<EmbedderKind>().is_err());
        assert_eq!(EmbedderKind::Model.to_string(), "model");
    }

    #[test]
    fn test_hash_provider_by_default() {
        let provider = create_provider(&ProviderSettings::default()).unwrap();

        assert_eq!(provider.name(), "simple-hash");
        assert_eq!(provider.dimension(), DEFAULT_EMBEDDING_DIM);
    }

    #[test]
    fn test_missing_model_falls_back_to_hash() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ProviderSettings {
            kind: EmbedderKind::Model,
            hash_dimension: 256,
            model_dir: Some(dir.path().join("multilingual-e5-small")),
            ..ProviderSettings::default()
        };

        let provider = create_provider(&settings).unwrap();

        assert_eq!(provider.name(), "simple-hash");
        assert_eq!(provider.dimension(), 256);
    }

    #[test]
    fn test_model_without_dir_falls_back_to_hash() {
        let settings = ProviderSettings {
            kind: EmbedderKind::Model,
            ..ProviderSettings::default()
        };

        assert_eq!(create_provider(&settings).unwrap().name(), "simple-hash");
    }

    #[test]
    fn test_zero_hash_dimension_is_an_error() {
        let settings = ProviderSettings {
            hash_dimension: 0,
            ..ProviderSettings::default()
        };

        assert!(create_provider(&settings).is_err());
    }
}
