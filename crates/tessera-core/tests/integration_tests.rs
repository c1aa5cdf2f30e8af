//! End-to-end integration tests for the complete indexing and search pipeline.
//!
//! These tests exercise the full workflow through the public API:
//! 1. Indexing: chunking → tokenization → embedding → BM25/vector indexing
//! 2. Search: query embedding → BM25/cosine scoring → RRF fusion → ranking
//! 3. Removal: compaction of every store and remapping of positions
//!
//! Run with: `cargo test -p tessera-core --test integration_tests`

use tessera_core::chunking::{chunk_text, TextChunk};
use tessera_core::config::{ChunkingConfig, IndexConfig};
use tessera_core::embedding::{
    create_provider, EmbedPurpose, EmbedderKind, EmbeddingProvider, HashEmbedder,
    ProviderSettings,
};
use tessera_core::search::{
    DocumentMetadata, RetrievalIndex, SearchMode, SearchRequest, SearchResult,
};
use tessera_core::EmbeddingError;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Axis-per-topic provider: a text points along every topic whose keyword it
/// mentions, so semantic similarity is predictable.
struct TopicEmbedder {
    topics: Vec<&'static str>,
}

impl EmbeddingProvider for TopicEmbedder {
    fn name(&self) -> &str {
        "topics"
    }

    fn dimension(&self) -> usize {
        self.topics.len()
    }

    fn embed(
        &self,
        texts: &[String],
        _purpose: EmbedPurpose,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                self.topics
                    .iter()
                    .map(|topic| if text.contains(topic) { 1.0 } else { 0.0 })
                    .collect()
            })
            .collect())
    }
}

fn topic_index() -> RetrievalIndex<TopicEmbedder> {
    let provider = TopicEmbedder {
        topics: vec!["fox", "python", "garden", "ocean"],
    };
    RetrievalIndex::new(provider, IndexConfig::default()).expect("valid config")
}

fn hash_index(window_size: usize, overlap: usize) -> RetrievalIndex<HashEmbedder> {
    let config = IndexConfig {
        chunking: ChunkingConfig {
            window_size,
            overlap,
        },
        ..IndexConfig::default()
    };
    RetrievalIndex::new(HashEmbedder::new(512).expect("non-zero dimension"), config)
        .expect("valid config")
}

fn single(text: &str) -> Vec<TextChunk> {
    vec![TextChunk::standalone(0, text)]
}

fn doc_ids(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.chunk.doc_id.as_str()).collect()
}

const LONG_DOCUMENT: &str = "Retrieval begins with chunking. Each document is split into \
    overlapping windows so that a passage near a boundary is still found! Tokens are \
    lower-cased and indexed for BM25. Embeddings capture meaning beyond exact words? \
    Reciprocal rank fusion merges both rankings into one list. Removing a document \
    compacts every store so positions stay dense.";

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_fox_example_all_modes() {
    let mut index = topic_index();
    index
        .add_document("a", single("The quick brown fox"), DocumentMetadata::default())
        .unwrap();
    index
        .add_document("b", single("Python programming basics"), DocumentMetadata::default())
        .unwrap();

    let lexical = index
        .search("fox", 10, None, Some(SearchMode::Lexical))
        .unwrap();
    assert_eq!(doc_ids(&lexical), vec!["a"]);
    assert_eq!(lexical[0].score, 1.0);

    let semantic = index
        .search("fox", 10, None, Some(SearchMode::Semantic))
        .unwrap();
    assert_eq!(doc_ids(&semantic), vec!["a", "b"]);
    assert!(semantic[0].score > semantic[1].score);

    let hybrid = index.search("fox", 10, None, None).unwrap();
    assert_eq!(hybrid[0].chunk.doc_id, "a");
}

#[test]
fn test_remove_then_restricted_search() {
    let mut index = topic_index();
    index
        .add_document(
            "A",
            vec![
                TextChunk::standalone(0, "a garden of roses"),
                TextChunk::standalone(1, "the garden path"),
            ],
            DocumentMetadata::default(),
        )
        .unwrap();
    index
        .add_document("B", single("ocean garden reef"), DocumentMetadata::default())
        .unwrap();

    index.remove_document("A").unwrap();

    assert_eq!(index.stats().total_chunks, 1);
    let results = index.search("garden", 10, Some(&["B"]), None).unwrap();
    assert_eq!(doc_ids(&results), vec!["B"]);
    index.assert_consistent();
}

#[test]
fn test_indexed_text_round_trips_through_chunker() {
    let mut index = hash_index(80, 20);

    let added = index
        .index_text(
            "guide",
            LONG_DOCUMENT,
            DocumentMetadata::with_filename("guide.md"),
        )
        .unwrap();

    let expected = chunk_text(LONG_DOCUMENT, 80, 20).unwrap();
    assert_eq!(added, expected.len());
    assert!(added > 1);

    let stored = index.document_chunks("guide");
    for (chunk, expected) in stored.iter().zip(&expected) {
        assert_eq!(chunk.text, expected.text);
        assert_eq!(chunk.start_char, expected.start_char);
        assert_eq!(chunk.end_char, expected.end_char);
    }
}

#[test]
fn test_lexical_search_finds_passage_across_documents() {
    let mut index = hash_index(80, 20);
    index
        .index_text("guide", LONG_DOCUMENT, DocumentMetadata::default())
        .unwrap();
    index
        .index_text(
            "other",
            "Gardening tips for spring. Water the tomatoes early.",
            DocumentMetadata::default(),
        )
        .unwrap();

    let results = index
        .search("reciprocal fusion", 3, None, Some(SearchMode::Lexical))
        .unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].chunk.doc_id, "guide");
    let top = results[0].chunk.text.to_lowercase();
    assert!(top.contains("reciprocal") || top.contains("fusion"));
    assert_eq!(results[0].score, 1.0);
}

#[test]
fn test_hebrew_documents_are_searchable() {
    let mut index = hash_index(200, 0);
    index
        .index_text("he", "שלום עולם, זהו מסמך בעברית", DocumentMetadata::default())
        .unwrap();
    index
        .index_text("en", "This is an English document", DocumentMetadata::default())
        .unwrap();

    let results = index
        .search("מסמך", 5, None, Some(SearchMode::Lexical))
        .unwrap();

    assert_eq!(doc_ids(&results), vec!["he"]);
}

#[test]
fn test_search_request_matches_positional_call() {
    let mut index = hash_index(100, 10);
    index
        .index_text("guide", LONG_DOCUMENT, DocumentMetadata::default())
        .unwrap();

    let request = SearchRequest::new("rankings list", 4).with_mode(SearchMode::Hybrid);
    let via_request = index.search_with(&request).unwrap();
    let direct = index
        .search("rankings list", 4, None, Some(SearchMode::Hybrid))
        .unwrap();

    assert_eq!(via_request, direct);
}

#[test]
fn test_many_documents_removal_keeps_index_consistent() {
    let mut index = hash_index(60, 10);
    for i in 0..12 {
        let text = format!("Document number {i}. {LONG_DOCUMENT}");
        index
            .index_text(&format!("doc-{i}"), &text, DocumentMetadata::default())
            .unwrap();
    }

    for i in (0..12).step_by(3) {
        assert!(index.remove_document(&format!("doc-{i}")).unwrap() > 0);
    }
    index.assert_consistent();

    assert_eq!(index.document_count(), 8);
    let results = index.search("compacts store", 50, None, None).unwrap();
    let removed = ["doc-0", "doc-3", "doc-6", "doc-9"];
    assert!(results
        .iter()
        .all(|r| !removed.contains(&r.chunk.doc_id.as_str())));
    assert!(removed.iter().all(|id| !index.contains_document(id)));
    for result in &results {
        let stored = &index.document_chunks(&result.chunk.doc_id);
        assert!(stored.iter().any(|c| c.text == result.chunk.text));
    }
}

#[test]
fn test_stats_serialize_for_reporting() {
    let mut index = hash_index(100, 10);
    index
        .index_text("guide", LONG_DOCUMENT, DocumentMetadata::default())
        .unwrap();

    let json = serde_json::to_value(index.stats()).unwrap();

    assert_eq!(json["embedding_provider"], "simple-hash");
    assert_eq!(json["default_mode"], "hybrid");
    assert_eq!(json["embedding_dimension"], 512);
    assert!(json["keyword"]["vocabulary_size"].as_u64().unwrap() > 10);
}

#[test]
fn test_unavailable_model_falls_back_to_hash_provider() {
    let missing = std::env::temp_dir().join("tessera-no-such-model");
    let settings = ProviderSettings {
        kind: EmbedderKind::Model,
        hash_dimension: 256,
        model_dir: Some(missing),
        ..ProviderSettings::default()
    };
    let provider = create_provider(&settings).unwrap();
    let mut index = RetrievalIndex::new(provider, IndexConfig::default()).unwrap();

    index
        .add_document("a", single("The quick brown fox"), DocumentMetadata::default())
        .unwrap();
    let results = index
        .search("fox", 5, None, Some(SearchMode::Semantic))
        .unwrap();

    assert_eq!(index.stats().embedding_provider, "simple-hash");
    assert_eq!(index.stats().embedding_dimension, 256);
    assert_eq!(doc_ids(&results), vec!["a"]);
}
