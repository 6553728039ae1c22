//! Exclusion rules for a scan.
//!
//! The effective pattern set is the explicit patterns, then the built-in
//! defaults, then every `.gitignore` between the repository root and the
//! scan root (root first). A path is excluded when any pattern matches its
//! base name or its full path.
//!
//! Ignore files are read as plain glob lists. Negation (`!pattern`) and
//! directory anchoring (`dir/`, `/file`) are not interpreted.

use crate::cache::CACHE_FILE_NAME;
use crate::IndexerError;
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the per-directory ignore file.
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// Directory marking a version-control root.
pub const VCS_MARKER: &str = ".git";

/// Patterns excluded from every scan.
pub const DEFAULT_PATTERNS: &[&str] = &[
    // Version control
    ".git",
    ".hg",
    ".svn",
    // Editors
    ".idea",
    ".vscode",
    ".vs",
    // Dependencies and caches
    "node_modules",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    "*.pyc",
    CACHE_FILE_NAME,
    // Virtual environments
    "venv",
    ".venv",
    "env",
];

/// Ordered, de-duplicated set of compiled glob patterns.
#[derive(Debug, Clone)]
pub struct IgnorePatternSet {
    patterns: Vec<String>,
    globs: GlobSet,
    /// Ignore files that contributed patterns
    pub sources: Vec<PathBuf>,
    /// Ignore files that existed but could not be read
    pub unreadable: Vec<PathBuf>,
}

impl IgnorePatternSet {
    /// Build a set from patterns in order. Invalid patterns are dropped with a warning.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept = Vec::new();
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.is_empty() || kept.iter().any(|p: &String| p == pattern) {
                continue;
            }
            match compile(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    kept.push(pattern.to_string());
                }
                Err(e) => warn!(error = %e, "Skipping ignore pattern"),
            }
        }

        let globs = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build ignore set, ignoring nothing");
            GlobSet::empty()
        });

        Self {
            patterns: kept,
            globs,
            sources: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    /// An empty set that excludes nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty::<&str>())
    }

    /// Patterns in insertion order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check whether `path` is excluded by base name or full path.
    pub fn is_ignored(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let by_name = path
            .file_name()
            .map(|n| self.globs.is_match(Path::new(n)))
            .unwrap_or(false);
        by_name || self.globs.is_match(path)
    }
}

/// Compile a single shell-style glob, honouring host case conventions.
fn compile(pattern: &str) -> Result<Glob, IndexerError> {
    GlobBuilder::new(pattern)
        .case_insensitive(cfg!(windows))
        .build()
        .map_err(|e| IndexerError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Build the effective ignore set for `scan_root`.
pub fn resolve(scan_root: &Path, explicit: &[String], use_ignore_file: bool) -> IgnorePatternSet {
    let mut patterns: Vec<String> = explicit.to_vec();
    patterns.extend(DEFAULT_PATTERNS.iter().map(|p| p.to_string()));

    let mut sources = Vec::new();
    let mut unreadable = Vec::new();

    if use_ignore_file {
        let root = scan_root
            .canonicalize()
            .unwrap_or_else(|_| scan_root.to_path_buf());

        if let Some(vcs_root) = find_vcs_root(&root) {
            for file in ignore_file_chain(&vcs_root, &root) {
                match fs::read_to_string(&file) {
                    Ok(content) => {
                        patterns.extend(parse_ignore_file(&content));
                        sources.push(file);
                    }
                    Err(e) => {
                        warn!(path = ?file, error = %e, "Unreadable ignore file");
                        unreadable.push(file);
                    }
                }
            }
        } else {
            debug!(path = ?root, "No repository root found, ignore files skipped");
        }
    }

    let mut set = IgnorePatternSet::new(patterns);
    set.sources = sources;
    set.unreadable = unreadable;

    debug!(
        patterns = set.len(),
        ignore_files = set.sources.len(),
        "Resolved ignore patterns"
    );

    set
}

/// Nearest ancestor of `start` (inclusive) containing the VCS marker.
pub fn find_vcs_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(VCS_MARKER).exists())
        .map(Path::to_path_buf)
}

/// Ignore files from `vcs_root` down to `scan_root` inclusive, root first.
pub fn ignore_file_chain(vcs_root: &Path, scan_root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<&Path> = scan_root
        .ancestors()
        .take_while(|dir| dir.starts_with(vcs_root))
        .collect();
    dirs.reverse();

    dirs.into_iter()
        .map(|dir| dir.join(IGNORE_FILE_NAME))
        .filter(|file| file.is_file())
        .collect()
}

/// Patterns from ignore-file content: one per line, blanks and `#` comments skipped.
pub fn parse_ignore_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
