//! Production configuration constants and the index configuration record.
//!
//! The constants define the defaults used throughout the crate, the CLI and
//! the benchmarks. [`IndexConfig`] bundles the tunables a deployment may
//! override (usually from a TOML file read by the CLI).
//!
//! # Usage
//!
//! ```
//! use tessera_core::config::{IndexConfig, DEFAULT_CHUNK_SIZE};
//!
//! let config = IndexConfig::default();
//! assert_eq!(config.chunking.window_size, DEFAULT_CHUNK_SIZE);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{ChunkingError, RetrievalError};
use crate::search::types::SearchMode;
use serde::{Deserialize, Serialize};

// =============================================================================
// Chunking Configuration
// =============================================================================

/// Maximum characters per chunk window.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Characters shared between consecutive chunk windows.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

// =============================================================================
// Ranking Configuration
// =============================================================================

/// Reciprocal Rank Fusion constant.
///
/// Fixed at 60 (Cormack, Clarke & Buettcher, SIGIR 2009); not configurable
/// per call.
pub const RRF_K: usize = 60;

/// BM25 term-frequency saturation.
pub const BM25_K1: f32 = 1.5;

/// BM25 length normalization.
pub const BM25_B: f32 = 0.75;

// =============================================================================
// Embedding Configuration
// =============================================================================

/// Dimension of the built-in hashing embedder.
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

/// Chunk window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per window (must be > 0)
    pub window_size: usize,
    /// Characters re-read at the start of the next window
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    /// Rejects windows that can never advance.
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.window_size == 0 {
            return Err(ChunkingError::InvalidConfig(
                "window_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// BM25 scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term-frequency saturation
    pub k1: f32,
    /// Length normalization in [0, 1]
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: BM25_K1,
            b: BM25_B,
        }
    }
}

/// Tunables for a [`RetrievalIndex`](crate::search::RetrievalIndex).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Window parameters for [`index_text`](crate::search::RetrievalIndex::index_text)
    pub chunking: ChunkingConfig,
    /// Lexical scoring parameters
    pub bm25: Bm25Params,
    /// Mode used when a search does not name one
    pub default_mode: SearchMode,
}

impl IndexConfig {
    /// Validates all nested sections.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        self.chunking.validate()?;
        let k1_valid = self.bm25.k1.is_finite() && self.bm25.k1 >= 0.0;
        if !k1_valid || !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(RetrievalError::InvalidInput(format!(
                "bm25 parameters out of range: k1={}, b={}",
                self.bm25.k1, self.bm25.b
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = IndexConfig::default();
        assert_eq!(config.chunking.window_size, 1000);
        assert_eq!(config.chunking.overlap, 200);
        assert_eq!(config.bm25.k1, BM25_K1);
        assert_eq!(config.default_mode, SearchMode::Hybrid);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = ChunkingConfig {
            window_size: 0,
            overlap: 0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bm25_b_out_of_range_rejected() {
        let config = IndexConfig {
            bm25: Bm25Params { k1: 1.2, b: 1.5 },
            ..IndexConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "chunking": { "window_size": 500 }, "default_mode": "lexical" }"#;
        let config: IndexConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.chunking.window_size, 500);
        assert_eq!(config.chunking.overlap, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(config.default_mode, SearchMode::Lexical);
    }
}
