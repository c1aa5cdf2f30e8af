//! Configuration for model-backed embedding providers.

use serde::{Deserialize, Serialize};

/// Default model for [`E5Embedder`](super::E5Embedder).
pub const DEFAULT_MODEL_ID: &str = "intfloat/multilingual-e5-small";

/// Settings for an E5-family sentence embedding model.
///
/// The architecture (hidden size, layers, heads) is read from the model's
/// own `config.json`; these settings only cover how the model is driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct E5Config {
    /// Model identifier (e.g. "intfloat/multilingual-e5-small")
    pub model_id: String,

    /// Tokens per text; longer inputs are truncated
    pub max_sequence_length: usize,

    /// Whether to apply L2 normalization to embeddings
    pub normalize_embeddings: bool,

    /// Texts per forward pass
    pub batch_size: usize,
}

impl Default for E5Config {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_sequence_length: 512,
            normalize_embeddings: true,
            batch_size: 16,
        }
    }
}

impl E5Config {
    /// E5 checkpoints expect `query:` / `passage:` instruction prefixes.
    pub fn uses_instruction_prefixes(&self) -> bool {
        self.model_id.to_lowercase().contains("e5")
    }
}
