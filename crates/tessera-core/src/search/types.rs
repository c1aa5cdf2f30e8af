use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Dense index into the chunk store and both sub-indexes.
///
/// Positions of live chunks always form the range `0..len`. They shift when
/// a document is removed, so they must not be held across mutations.
pub type Position = usize;

/// Document-level metadata shared by every chunk of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    /// Original filename if available
    pub filename: Option<String>,
    /// Kind of source the text came from (e.g. "pdf", "markdown")
    pub source_type: Option<String>,
    /// Workspace scoping tag
    pub workspace: Option<String>,
    /// Free-form key/value pairs
    pub extra: BTreeMap<String, String>,
}

impl DocumentMetadata {
    /// Metadata carrying only a filename.
    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Self::default()
        }
    }
}

/// One retrievable passage of a document.
///
/// Chunks are immutable once indexed. Metadata is shared with the other
/// chunks of the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Owning document
    pub doc_id: String,
    /// Sequence number within the document
    pub chunk_index: usize,
    /// Raw chunk text
    pub text: String,
    /// Start character offset (inclusive)
    pub start_char: usize,
    /// End character offset (exclusive)
    pub end_char: usize,
    /// Document-level metadata
    pub metadata: Arc<DocumentMetadata>,
}

/// Which scores contribute to a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Reciprocal Rank Fusion of lexical and semantic rankings
    #[default]
    Hybrid,
    /// BM25 only, scores normalized by the best match
    Lexical,
    /// Cosine similarity only
    Semantic,
}

impl SearchMode {
    /// Lower-case name as used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Hybrid => "hybrid",
            SearchMode::Lexical => "lexical",
            SearchMode::Semantic => "semantic",
        }
    }

    pub(crate) fn uses_lexical(&self) -> bool {
        matches!(self, SearchMode::Hybrid | SearchMode::Lexical)
    }

    pub(crate) fn uses_semantic(&self) -> bool {
        matches!(self, SearchMode::Hybrid | SearchMode::Semantic)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hybrid" => Ok(SearchMode::Hybrid),
            "lexical" | "keyword" | "bm25" => Ok(SearchMode::Lexical),
            "semantic" | "vector" => Ok(SearchMode::Semantic),
            other => Err(format!(
                "unknown search mode '{other}' (expected hybrid, lexical or semantic)"
            )),
        }
    }
}

/// Search result with relevance scores.
///
/// `score` is the value results are ranked by: the RRF score in hybrid mode,
/// the max-normalized BM25 score in lexical mode, the cosine similarity in
/// semantic mode. The component scores are reported when they were computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Position of the chunk at query time
    pub position: Position,
    /// Final ranking score
    pub score: f32,
    /// Raw BM25 score, if the chunk matched lexically
    pub keyword_score: Option<f32>,
    /// Cosine similarity, if semantic scoring ran
    pub vector_score: Option<f32>,
    /// The matching chunk
    pub chunk: Chunk,
}

/// Parameters for [`RetrievalIndex::search_with`](crate::search::RetrievalIndex::search_with).
///
/// # Examples
///
/// ```
/// use tessera_core::search::{SearchMode, SearchRequest};
///
/// let request = SearchRequest::new("quick fox", 5)
///     .with_candidates(["doc-a", "doc-b"])
///     .with_mode(SearchMode::Lexical);
/// assert_eq!(request.top_k, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Raw query text
    pub query: String,
    /// Maximum number of results
    pub top_k: usize,
    /// Restrict the search to these documents
    pub candidates: Option<Vec<String>>,
    /// Override the index default mode
    pub mode: Option<SearchMode>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            candidates: None,
            mode: None,
        }
    }

    pub fn with_candidates<I, S>(mut self, doc_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = Some(doc_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// One indexed document as reported by
/// [`list_documents`](crate::search::RetrievalIndex::list_documents).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub doc_id: String,
    pub metadata: Arc<DocumentMetadata>,
    pub chunk_count: usize,
}

/// Lexical index counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeywordStats {
    pub chunks: usize,
    pub total_tokens: usize,
    pub avg_tokens_per_chunk: f64,
    pub vocabulary_size: usize,
}

/// Semantic index counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VectorStats {
    pub vectors: usize,
    pub dimension: usize,
    /// Vectors whose similarity to anything is defined as 0
    pub zero_norm_vectors: usize,
}

/// Diagnostic snapshot of a retrieval index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub total_chunks: usize,
    pub total_documents: usize,
    pub embedding_dimension: usize,
    pub embedding_provider: String,
    pub default_mode: SearchMode,
    pub keyword: KeywordStats,
    pub vector: VectorStats,
}

/// Drops the items at `removed` while keeping the relative order of the rest.
pub(crate) fn compact_in_place<T>(items: &mut Vec<T>, removed: &HashSet<Position>) {
    let mut position = 0;
    items.retain(|_| {
        let keep = !removed.contains(&position);
        position += 1;
        keep
    });
}
