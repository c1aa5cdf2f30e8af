//! Configuration loading for the CLI.
//!
//! The index configuration is resolved in three layers:
//! 1. `IndexConfig::default()`
//! 2. A TOML file: `--config <path>` / `$TESSERA_CONFIG`, otherwise
//!    `config.toml` in the platform config directory if it exists
//! 3. Command-line flags
//!
//! ```toml
//! default_mode = "lexical"
//!
//! [chunking]
//! window_size = 600
//! overlap = 100
//!
//! [bm25]
//! k1 = 1.2
//! b = 0.75
//! ```

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tessera_core::config::IndexConfig;
use tessera_core::search::SearchMode;
use tracing::{debug, info};

/// Config file name inside the platform config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Returns the platform config directory.
///
/// - macOS: `~/Library/Application Support/dev.tessera.Tessera/`
/// - Linux: `~/.config/tessera/`
/// - Windows: `%APPDATA%\tessera\Tessera\config\`
pub fn get_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("dev", "tessera", "Tessera")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine config directory"))
}

/// Default location of a local model: `<data dir>/models/<model name>`.
///
/// For `intfloat/multilingual-e5-small` on Linux this is
/// `~/.local/share/tessera/models/multilingual-e5-small/`.
pub fn default_model_dir(model_id: &str) -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "tessera", "Tessera")
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;
    let name = model_id.rsplit('/').next().unwrap_or(model_id);
    Ok(dirs.data_dir().join("models").join(name))
}

/// Loads the index configuration.
///
/// An explicit path must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<IndexConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let default_path = match get_config_dir() {
        Ok(dir) => dir.join(CONFIG_FILENAME),
        Err(e) => {
            debug!("{}; using built-in defaults", e);
            return Ok(IndexConfig::default());
        }
    };
    if default_path.exists() {
        read_config(&default_path)
    } else {
        debug!(
            "No config file at {}, using built-in defaults",
            default_path.display()
        );
        Ok(IndexConfig::default())
    }
}

fn read_config(path: &Path) -> Result<IndexConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = parse_config(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parses TOML into an `IndexConfig`; missing keys keep their defaults.
pub fn parse_config(text: &str) -> Result<IndexConfig> {
    Ok(toml::from_str(text)?)
}

/// Values given on the command line, applied over the loaded config.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub window_size: Option<usize>,
    pub overlap: Option<usize>,
    pub mode: Option<SearchMode>,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: IndexConfig) -> IndexConfig {
        if let Some(window_size) = self.window_size {
            config.chunking.window_size = window_size;
        }
        if let Some(overlap) = self.overlap {
            config.chunking.overlap = overlap;
        }
        if let Some(mode) = self.mode {
            config.default_mode = mode;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tessera_core::config::DEFAULT_CHUNK_OVERLAP;

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
            default_mode = "semantic"

            [chunking]
            window_size = 300
            "#,
        )
        .unwrap();

        assert_eq!(config.default_mode, SearchMode::Semantic);
        assert_eq!(config.chunking.window_size, 300);
        assert_eq!(config.chunking.overlap, DEFAULT_CHUNK_OVERLAP);
    }

    #[test]
    fn test_parse_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), IndexConfig::default());
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(parse_config(r#"default_mode = "fuzzy""#).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bm25]\nk1 = 1.2\nb = 0.5").unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.bm25.k1, 1.2);
        assert_eq!(config.bm25.b, 0.5);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = load_config(Some(&missing)).unwrap_err().to_string();

        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_invalid_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chunking\nwindow_size = ").unwrap();

        let err = load_config(Some(file.path())).unwrap_err().to_string();

        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = ConfigOverrides {
            window_size: Some(120),
            overlap: None,
            mode: Some(SearchMode::Lexical),
        };

        let config = overrides.apply(IndexConfig::default());

        assert_eq!(config.chunking.window_size, 120);
        assert_eq!(config.chunking.overlap, DEFAULT_CHUNK_OVERLAP);
        assert_eq!(config.default_mode, SearchMode::Lexical);
    }

    #[test]
    fn test_default_model_dir_uses_model_name() {
        if let Ok(dir) = default_model_dir("intfloat/multilingual-e5-small") {
            assert!(dir.ends_with("models/multilingual-e5-small"));
        }
    }

    #[test]
    fn test_get_config_dir() {
        if let Ok(dir) = get_config_dir() {
            let dir_str = dir.to_string_lossy().to_lowercase();
            assert!(dir_str.contains("tessera"), "unexpected config dir: {}", dir_str);
        }
    }
}
