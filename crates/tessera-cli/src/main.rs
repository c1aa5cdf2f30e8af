//! Tessera CLI - hybrid passage search over a directory of text files.
//!
//! # Usage
//!
//! ```bash
//! # Index ./notes and search it
//! tsr ./notes "search query"
//! tsr ./notes "rust embeddings" -n 5 --mode lexical
//! tsr ./notes "query" --json
//!
//! # Only search inside some documents (ids are paths relative to the root)
//! tsr ./notes "query" --doc guide.md --doc todo.txt
//!
//! # Semantic ranking with a local E5 model
//! tsr ./notes "query" --embedder model --model-dir ./models/multilingual-e5-small
//!
//! # Show index statistics
//! tsr ./notes --stats
//! ```

mod config;
mod output;
mod search;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tessera_core::config::DEFAULT_EMBEDDING_DIM;
use tessera_core::embedding::{create_provider, EmbedderKind, ProviderSettings};
use tessera_core::search::SearchMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tessera hybrid search CLI.
///
/// Indexes every .txt and .md file under DOCS in memory, then ranks passages
/// by BM25, embedding similarity, or both fused with reciprocal rank fusion.
#[derive(Parser)]
#[command(name = "tsr", version, about)]
struct Cli {
    /// File or directory to index
    #[arg(env = "TESSERA_DOCS")]
    docs: PathBuf,

    /// Search query
    query: Option<String>,

    /// Maximum number of results to return
    #[arg(short = 'n', long, default_value = "10", env = "TESSERA_LIMIT")]
    limit: usize,

    /// Ranking mode: hybrid, lexical or semantic
    #[arg(short, long, env = "TESSERA_MODE")]
    mode: Option<SearchMode>,

    /// Restrict the search to these document ids (repeatable)
    #[arg(long = "doc", value_name = "DOC_ID")]
    docs_filter: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Print index statistics instead of searching
    #[arg(long)]
    stats: bool,

    /// Config file (default: config.toml in the platform config directory)
    #[arg(long, env = "TESSERA_CONFIG")]
    config: Option<PathBuf>,

    /// Characters per chunk window (overrides the config file)
    #[arg(long, env = "TESSERA_WINDOW_SIZE")]
    window_size: Option<usize>,

    /// Characters shared by consecutive windows (overrides the config file)
    #[arg(long, env = "TESSERA_OVERLAP")]
    overlap: Option<usize>,

    /// Embedding provider: hash, or model (falls back to hash if unavailable)
    #[arg(long, default_value_t = EmbedderKind::Hash, env = "TESSERA_EMBEDDER")]
    embedder: EmbedderKind,

    /// Directory with config.json, tokenizer.json and model.safetensors
    /// (default: models/multilingual-e5-small in the platform data directory)
    #[arg(long, env = "TESSERA_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Dimension of the hashing embedder
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIM, env = "TESSERA_DIMENSION")]
    dimension: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays machine-readable
    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let overrides = config::ConfigOverrides {
        window_size: cli.window_size,
        overlap: cli.overlap,
        mode: cli.mode,
    };
    let index_config = config::load_config(cli.config.as_deref())?;
    let index_config = overrides.apply(index_config);
    index_config
        .validate()
        .context("Invalid index configuration")?;

    let mut settings = ProviderSettings {
        kind: cli.embedder,
        hash_dimension: cli.dimension,
        model_dir: cli.model_dir,
        ..ProviderSettings::default()
    };
    if settings.kind == EmbedderKind::Model && settings.model_dir.is_none() {
        settings.model_dir = config::default_model_dir(&settings.model.model_id).ok();
    }
    let provider = create_provider(&settings).context("Failed to create embedding provider")?;

    let corpus = search::build_index(&cli.docs, index_config, provider)?;
    info!(
        files = corpus.files,
        latin1 = corpus.latin1,
        chunks = corpus.index.len(),
        "Index ready"
    );

    if cli.stats {
        let stats = corpus.index.stats();
        let output = if cli.json {
            output::format_stats_json(&stats)
        } else {
            output::format_stats_human(&stats)
        };
        println!("{}", output);
        return Ok(());
    }

    let Some(query) = cli.query.as_deref() else {
        bail!("No search query provided. Use --help for usage information.");
    };

    let results = search::execute_search(&corpus.index, query, cli.limit, &cli.docs_filter)?;
    let mode = corpus.index.config().default_mode;

    let output = if cli.json {
        output::format_json(query, mode, &results)
    } else {
        output::format_human(query, &results)
    };
    println!("{}", output);

    Ok(())
}
