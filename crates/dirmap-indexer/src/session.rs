//! Scan sessions: cache lifecycle around a single walk.
//!
//! A session resolves ignore rules, loads the cache, walks the tree, then
//! prunes and persists the cache. Cache I/O problems are reported as
//! warnings on the report; they never discard the scan result.

use crate::cache::{ScanCache, CACHE_FILE_NAME};
use crate::ignore_rules;
use crate::project::{detect_project_type, ProjectType};
use crate::summary::DEFAULT_WINDOW_BYTES;
use crate::tree::{ScanStats, TreeNode};
use crate::walker::{validate_root, TreeWalker, WalkOptions};
use crate::IndexerError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Options for scanning a directory.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Patterns excluded in addition to the defaults
    pub ignore_patterns: Vec<String>,
    /// Maximum directory depth to expand (None = unlimited)
    pub max_depth: Option<usize>,
    /// Whether to read `.gitignore` files up to the repository root
    pub use_ignore_file: bool,
    /// Whether to load, use and persist the mtime cache
    pub use_cache: bool,
    /// Whether to delete the persisted cache before scanning
    pub clear_cache: bool,
    /// Whether to skip content summaries
    pub omit_content: bool,
    /// Bytes of content read per file
    pub window_bytes: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            max_depth: None,
            use_ignore_file: true,
            use_cache: true,
            clear_cache: false,
            omit_content: false,
            window_bytes: DEFAULT_WINDOW_BYTES,
        }
    }
}

/// Result of a scan session.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Canonical root that was scanned
    pub root: PathBuf,
    /// Detected project type
    pub project_type: ProjectType,
    /// Scanned tree
    pub tree: TreeNode,
    /// Aggregate counters
    pub stats: ScanStats,
    /// Non-fatal problems (cache I/O, unreadable ignore files)
    pub warnings: Vec<String>,
    /// Scan duration in milliseconds
    pub duration_ms: u64,
}

/// Orchestrates ignore resolution, caching and the tree walk.
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Create a new scanner with default options.
    pub fn new() -> Self {
        Self {
            options: ScanOptions::default(),
        }
    }

    /// Create a scanner with custom options.
    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Path of the persisted cache for `root`.
    pub fn cache_path(root: &Path) -> PathBuf {
        root.join(CACHE_FILE_NAME)
    }

    /// Scan `root`. Only an invalid root is an error.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, IndexerError> {
        let root = validate_root(root)?;
        let cache_path = Self::cache_path(&root);
        let mut warnings = Vec::new();

        info!(path = ?root, "Starting scan");

        if self.options.clear_cache {
            if let Err(e) = ScanCache::clear(&cache_path) {
                warn!(path = ?cache_path, error = %e, "Failed to clear cache");
                warnings.push(format!("Failed to clear cache: {}", e));
            }
        }

        let mut cache = if self.options.use_cache {
            ScanCache::load(&cache_path).unwrap_or_else(|e| {
                warn!(path = ?cache_path, error = %e, "Failed to load cache, starting empty");
                warnings.push(format!("Failed to load cache: {}", e));
                ScanCache::new()
            })
        } else {
            ScanCache::new()
        };

        let ignore = ignore_rules::resolve(
            &root,
            &self.options.ignore_patterns,
            self.options.use_ignore_file,
        );
        for file in &ignore.unreadable {
            warnings.push(format!("Unreadable ignore file: {}", file.display()));
        }

        let walk_options = WalkOptions {
            max_depth: self.options.max_depth,
            use_cache: self.options.use_cache,
            omit_content: self.options.omit_content,
            window_bytes: self.options.window_bytes,
        };
        let output = TreeWalker::new(&ignore, walk_options).walk(&root, &mut cache)?;

        if self.options.use_cache {
            cache.prune(&root);
            if let Err(e) = cache.save(&cache_path) {
                warn!(path = ?cache_path, error = %e, "Failed to save cache");
                warnings.push(format!("Failed to save cache: {}", e));
            }
        }

        let project_type = detect_project_type(&root);

        info!(
            files = output.stats.files,
            dirs = output.stats.dirs,
            skipped = output.stats.skipped,
            project_type = %project_type,
            duration_ms = output.duration_ms,
            "Scan complete"
        );

        Ok(ScanReport {
            root,
            project_type,
            tree: output.tree,
            stats: output.stats,
            warnings,
            duration_ms: output.duration_ms,
        })
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}
