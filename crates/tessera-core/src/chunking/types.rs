//! Types for text chunking.

use serde::{Deserialize, Serialize};

/// A chunk of text with its position in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Index of this chunk in the document (0-based, blank windows skipped)
    pub index: usize,
    /// Trimmed text content of this chunk
    pub text: String,
    /// Character offset where the window starts in the original document
    pub start_char: usize,
    /// Character offset where the window ends (exclusive)
    pub end_char: usize,
}

impl TextChunk {
    /// Convenience constructor for chunks that do not come from the chunker.
    ///
    /// Offsets span the text itself, as if it were the whole document.
    pub fn standalone(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let end_char = text.chars().count();
        Self {
            index,
            text,
            start_char: 0,
            end_char,
        }
    }
}
