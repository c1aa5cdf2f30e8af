//! Output formatting for search results and index statistics.
//!
//! Supports both human-readable terminal output and JSON for scripting.
//! Results are passage-level: one entry per matching chunk.

use serde::Serialize;
use tessera_core::search::{IndexStats, SearchMode, SearchResult};

/// Maximum characters to show in text snippet
const SNIPPET_MAX_LEN: usize = 200;

/// JSON output structure for search results
#[derive(Serialize)]
pub struct JsonOutput<'a> {
    pub query: &'a str,
    pub mode: SearchMode,
    pub results: Vec<JsonPassage<'a>>,
}

/// Passage-level result in JSON format
#[derive(Serialize)]
pub struct JsonPassage<'a> {
    pub doc_id: &'a str,
    pub chunk_index: usize,
    pub score: f32,
    pub keyword_score: Option<f32>,
    pub vector_score: Option<f32>,
    pub start_char: usize,
    pub end_char: usize,
    pub filename: Option<&'a str>,
    pub text: &'a str,
}

impl<'a> From<&'a SearchResult> for JsonPassage<'a> {
    fn from(result: &'a SearchResult) -> Self {
        let chunk = &result.chunk;
        Self {
            doc_id: &chunk.doc_id,
            chunk_index: chunk.chunk_index,
            score: result.score,
            keyword_score: result.keyword_score,
            vector_score: result.vector_score,
            start_char: chunk.start_char,
            end_char: chunk.end_char,
            filename: chunk.metadata.filename.as_deref(),
            text: &chunk.text,
        }
    }
}

/// Formats search results as JSON.
pub fn format_json(query: &str, mode: SearchMode, results: &[SearchResult]) -> String {
    let output = JsonOutput {
        query,
        mode,
        results: results.iter().map(JsonPassage::from).collect(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats search results for human-readable terminal output.
pub fn format_human(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results found for \"{}\"", query);
    }

    let mut output = String::new();
    output.push_str(&format!(
        "Found {} passage{} for \"{}\":\n\n",
        results.len(),
        if results.len() == 1 { "" } else { "s" },
        query
    ));

    for (i, result) in results.iter().enumerate() {
        let chunk = &result.chunk;
        output.push_str(&format!(
            "{}. {} #{} (score: {:.4})\n",
            i + 1,
            chunk.doc_id,
            chunk.chunk_index,
            result.score
        ));

        let mut score_parts = Vec::new();
        if let Some(ks) = result.keyword_score {
            score_parts.push(format!("keyword: {:.2}", ks));
        }
        if let Some(vs) = result.vector_score {
            score_parts.push(format!("semantic: {:.2}", vs));
        }
        if !score_parts.is_empty() {
            output.push_str(&format!("   [{}]\n", score_parts.join(", ")));
        }

        let snippet = truncate_text(&chunk.text, SNIPPET_MAX_LEN);
        output.push_str(&format!("   {}\n", indent_text(&snippet, "   ")));
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Formats index statistics as JSON.
pub fn format_stats_json(stats: &IndexStats) -> String {
    serde_json::to_string_pretty(stats).unwrap_or_else(|_| "{}".to_string())
}

/// Formats index statistics for the terminal.
pub fn format_stats_human(stats: &IndexStats) -> String {
    let lines = [
        format!("Documents:        {}", stats.total_documents),
        format!("Chunks:           {}", stats.total_chunks),
        format!(
            "Embedder:         {} ({} dims)",
            stats.embedding_provider, stats.embedding_dimension
        ),
        format!("Default mode:     {}", stats.default_mode),
        format!("Vocabulary:       {} terms", stats.keyword.vocabulary_size),
        format!(
            "Tokens:           {} ({:.1} per chunk)",
            stats.keyword.total_tokens, stats.keyword.avg_tokens_per_chunk
        ),
        format!("Zero vectors:     {}", stats.vector.zero_norm_vectors),
    ];
    lines.join("\n")
}

/// Truncates text to at most `max_chars` characters, adding ellipsis if needed.
fn truncate_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    // Find a word boundary near the cut
    let truncated = &text[..cut];
    match truncated.rfind(' ') {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}

/// Indents all lines of text after the first line.
fn indent_text(text: &str, indent: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.to_string()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
