//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths to all VnLegal data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite database directory (`data/db/`).
    pub db: PathBuf,
    /// Uploaded source documents (`data/uploads/`).
    pub uploads: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            uploads: root.join("uploads"),
            llm_config_file: root.join("llm-config.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.db)?;
        std::fs::create_dir_all(&self.uploads)?;
        Ok(())
    }
}

/// Switches for the optional parts of the splitting pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterSettings {
    /// Ask the LLM capability for the title keyword when it is available.
    pub use_llm: bool,
    /// Ask the LLM capability for a per-block category before the rule tables.
    pub llm_category: bool,
    /// Emit `Chương` headings as their own blocks instead of only using them as delimiters.
    pub emit_chapters: bool,
    /// Split a khoản into `Điểm` blocks when it lists lettered points.
    pub split_points: bool,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        Self {
            use_llm: true,
            llm_category: false,
            emit_chapters: false,
            split_points: false,
        }
    }
}

impl SplitterSettings {
    /// Read the `VNLEGAL_*` switches, keeping defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            use_llm: env_flag("VNLEGAL_USE_LLM").unwrap_or(defaults.use_llm),
            llm_category: env_flag("VNLEGAL_LLM_CATEGORY").unwrap_or(defaults.llm_category),
            emit_chapters: env_flag("VNLEGAL_EMIT_CHAPTERS").unwrap_or(defaults.emit_chapters),
            split_points: env_flag("VNLEGAL_SPLIT_POINTS").unwrap_or(defaults.split_points),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Top-level VnLegal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VnLegalConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Splitter pipeline switches.
    pub splitter: SplitterSettings,
}

impl VnLegalConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            splitter: SplitterSettings::from_env(),
        })
    }
}
