//! Configuration for the dirmap CLI.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent defaults for scans, overridden by command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirmapConfig {
    /// Extra patterns to exclude, added to any given on the command line
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Maximum directory depth to expand
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Read `.gitignore` files up to the repository root
    #[serde(default = "default_true")]
    pub use_ignore_file: bool,

    /// Reuse and persist the mtime cache
    #[serde(default = "default_true")]
    pub use_cache: bool,

    /// Skip content summaries
    #[serde(default)]
    pub omit_content: bool,

    /// Bytes read per file for summaries (default: 8KB)
    #[serde(default = "default_window_bytes")]
    pub window_bytes: usize,

    /// Approximate token budget for the rendered report
    #[serde(default)]
    pub max_tokens: Option<usize>,

    /// Summary lines shown under each file in text output
    #[serde(default = "default_summary_lines")]
    pub summary_lines: usize,

    /// Report destination when not writing to stdout
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_window_bytes() -> usize {
    dirmap_indexer::summary::DEFAULT_WINDOW_BYTES
}

fn default_summary_lines() -> usize {
    dirmap_render::DEFAULT_SUMMARY_LINES
}

fn default_output_file() -> PathBuf {
    PathBuf::from("directory_structure.txt")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for DirmapConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            max_depth: None,
            use_ignore_file: true,
            use_cache: true,
            omit_content: false,
            window_bytes: default_window_bytes(),
            max_tokens: None,
            summary_lines: default_summary_lines(),
            output_file: default_output_file(),
            log_level: default_log_level(),
        }
    }
}

impl DirmapConfig {
    /// Location of the user config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dirmap").join("config.yaml"))
    }

    /// Load from `explicit`, or from the default location.
    ///
    /// A missing default file yields defaults; a missing explicit file is
    /// an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, std::io::Error> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
