//! Embedding provider abstractions and implementations.
//!
//! ## Core Traits
//!
//! - [`EmbeddingProvider`] - External embedding capability used by the index
//!
//! ## Implementations
//!
//! - [`E5Embedder`] - Local sentence embedding model on Candle
//! - [`HashEmbedder`] - Deterministic bag-of-words hashing, no model required
//!
//! [`create_provider`] picks one at runtime and falls back to hashing when
//! the model is unavailable.

mod config;
mod factory;
mod hash;
mod model;
mod traits;

pub use config::{E5Config, DEFAULT_MODEL_ID};
pub use factory::{create_provider, DynEmbeddingProvider, EmbedderKind, ProviderSettings};
pub use hash::HashEmbedder;
pub use model::{prepare_input, E5Embedder, CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE};
pub use traits::{validate_dimension, EmbedPurpose, EmbeddingProvider};
