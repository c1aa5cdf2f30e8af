//! Text chunking for document processing.
//!
//! Splits a document's extracted plain text into overlapping windows before
//! tokenization and embedding. Windows are measured in characters (Unicode
//! scalar values) and the split point is pulled back to a natural boundary:
//!
//! 1. the sentence terminator (`.`, `!`, `?`) closest to the window end, if it
//!    lies past the window midpoint;
//! 2. otherwise the last whitespace inside the window;
//! 3. otherwise a hard split at the window size.
//!
//! Each window is trimmed and empty windows are dropped. The next window
//! starts `overlap` characters before the previous end, and always at least
//! one character after the previous start.

mod types;

use crate::config::ChunkingConfig;
use crate::error::ChunkingError;
use tracing::{debug, instrument};

pub use types::TextChunk;

/// Trait for text chunking strategies.
///
/// Implementations define how to split text into retrieval units. Chunks are
/// returned ordered by their position in the source document.
pub trait ChunkingStrategy: Send + Sync {
    /// Splits text into chunks according to this strategy.
    fn chunk(&self, text: &str) -> Vec<TextChunk>;

    /// Returns a human-readable name for this strategy.
    fn name(&self) -> &'static str;
}

/// Boundary-aware sliding window chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowChunker {
    config: ChunkingConfig,
}

impl WindowChunker {
    /// Creates a chunker after validating the window parameters.
    pub fn new(config: ChunkingConfig) -> Result<Self, ChunkingError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the window parameters in use.
    pub fn config(&self) -> ChunkingConfig {
        self.config
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }
}

impl ChunkingStrategy for WindowChunker {
    fn chunk(&self, text: &str) -> Vec<TextChunk> {
        split_windows(text, self.config.window_size, self.config.overlap)
    }

    fn name(&self) -> &'static str {
        "window"
    }
}

/// Splits `text` into overlapping windows of at most `window_size` characters.
///
/// # Errors
///
/// Returns [`ChunkingError::InvalidConfig`] when `window_size` is 0.
pub fn chunk_text(
    text: &str,
    window_size: usize,
    overlap: usize,
) -> Result<Vec<TextChunk>, ChunkingError> {
    ChunkingConfig {
        window_size,
        overlap,
    }
    .validate()?;
    Ok(split_windows(text, window_size, overlap))
}

#[instrument(
    skip_all,
    fields(text_len = text.len(), window_size = window_size, overlap = overlap)
)]
fn split_windows(text: &str, window_size: usize, overlap: usize) -> Vec<TextChunk> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < len {
        let mut end = (start + window_size).min(len);
        if end < len {
            end = align_boundary(&chars, start, end, window_size);
        }

        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(TextChunk {
                index: chunks.len(),
                text: trimmed.to_string(),
                start_char: start,
                end_char: end,
            });
        }

        if end >= len {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    debug!("Split {} chars into {} chunks", len, chunks.len());
    chunks
}

/// Pulls a tentative window end back to a sentence or word boundary.
///
/// Always returns a value in `(start, end]`.
fn align_boundary(chars: &[char], start: usize, end: usize, window_size: usize) -> usize {
    let midpoint = start + window_size / 2;

    let sentence_end = (start..end)
        .rev()
        .find(|&i| matches!(chars[i], '.' | '!' | '?'));
    if let Some(pos) = sentence_end {
        if pos > midpoint {
            return pos + 1;
        }
    }

    (start + 1..end)
        .rev()
        .find(|&i| chars[i].is_whitespace())
        .unwrap_or(end)
}
