//! Corpus loading and query execution.
//!
//! Every supported text file under the root becomes one document whose id is
//! its path relative to the root. The index lives in memory for the duration
//! of the command.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tessera_core::config::IndexConfig;
use tessera_core::embedding::DynEmbeddingProvider;
use tessera_core::search::{DocumentMetadata, RetrievalIndex, SearchResult};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File extensions indexed, with the source type recorded for each.
const SUPPORTED_EXTENSIONS: &[(&str, &str)] =
    &[("txt", "text"), ("md", "markdown"), ("markdown", "markdown")];

/// An in-memory index over a directory tree.
pub struct Corpus {
    pub index: RetrievalIndex<DynEmbeddingProvider>,
    /// Files indexed
    pub files: usize,
    /// Files that were not valid UTF-8 and were decoded as Latin-1
    pub latin1: usize,
}

fn source_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|(supported, _)| *supported == ext)
        .map(|(_, kind)| *kind)
}

/// Maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Document id for `path`: relative to `root` with forward slashes, or the
/// file name when `root` is the file itself.
fn doc_id_for(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        _ => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    }
}

/// Indexes every supported file under `root`.
///
/// Files are visited in file-name order so document ids and positions are
/// stable between runs.
pub fn build_index(
    root: &Path,
    config: IndexConfig,
    provider: DynEmbeddingProvider,
) -> Result<Corpus> {
    if !root.exists() {
        bail!("Path not found: {}", root.display());
    }

    let mut index =
        RetrievalIndex::new(provider, config).context("Failed to create retrieval index")?;
    let mut files = 0;
    let mut latin1 = 0;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(kind) = source_type(path) else {
            debug!("Skipping unsupported file {}", path.display());
            continue;
        };

        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                warn!("{} is not valid UTF-8, decoding as Latin-1", path.display());
                latin1 += 1;
                decode_latin1(err.as_bytes())
            }
        };

        let doc_id = doc_id_for(root, path);
        let mut metadata = DocumentMetadata {
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            source_type: Some(kind.to_string()),
            ..DocumentMetadata::default()
        };
        metadata
            .extra
            .insert("path".to_string(), path.display().to_string());

        let chunks = index
            .index_text(&doc_id, &text, metadata)
            .with_context(|| format!("Failed to index {}", path.display()))?;
        debug!(doc_id = %doc_id, chunks, "Indexed file");
        files += 1;
    }

    info!(
        "Indexed {} files ({} chunks) from {}",
        files,
        index.len(),
        root.display()
    );
    Ok(Corpus {
        index,
        files,
        latin1,
    })
}

/// Runs `query` in the index's default mode.
///
/// An empty `doc_filter` searches every document.
pub fn execute_search(
    index: &RetrievalIndex<DynEmbeddingProvider>,
    query: &str,
    limit: usize,
    doc_filter: &[String],
) -> Result<Vec<SearchResult>> {
    let candidates: Vec<&str> = doc_filter.iter().map(String::as_str).collect();
    let candidates = (!candidates.is_empty()).then_some(candidates.as_slice());

    info!("Searching for: \"{}\"", query);
    let results = index
        .search(query, limit, candidates, None)
        .context("Search failed")?;
    info!("Found {} passages", results.len());
    Ok(results)
}
