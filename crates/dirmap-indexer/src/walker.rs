//! Depth-bounded, ignore-aware directory traversal.
//!
//! Traversal runs on `ignore::WalkBuilder` with its own filters switched
//! off; exclusion comes from the scan's [`IgnorePatternSet`] alone. Nodes
//! are assembled from the depth-first stream, and each directory's
//! children are sorted by `(is_file, lowercase name)` once complete.
//!
//! Failures below the root never abort the walk: unreadable directories
//! and entries are counted as skipped, unreadable content becomes an
//! error summary. Symlinks are measured through the link; a dangling link
//! is skipped and a linked directory is listed without being expanded.

use crate::cache::ScanCache;
use crate::ignore_rules::IgnorePatternSet;
use crate::summary::{self, ContentReader, FsContentReader, DEFAULT_WINDOW_BYTES};
use crate::tree::{mtime_secs, NodeKind, ScanStats, TreeNode};
use crate::IndexerError;
use ignore::{DirEntry, WalkBuilder};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Options controlling a single walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Directories at this depth or deeper are not expanded (root is depth 0)
    pub max_depth: Option<usize>,
    /// Reuse and update cached nodes
    pub use_cache: bool,
    /// Skip content reads and summaries
    pub omit_content: bool,
    /// Bytes of content read per file for summarization
    pub window_bytes: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            use_cache: true,
            omit_content: false,
            window_bytes: DEFAULT_WINDOW_BYTES,
        }
    }
}

/// Output of a walk.
#[derive(Debug, Clone)]
pub struct WalkOutput {
    /// Root node of the scanned tree
    pub tree: TreeNode,
    /// Aggregate counters
    pub stats: ScanStats,
    /// Walk duration in milliseconds
    pub duration_ms: u64,
}

/// A walked entry with link-followed metadata.
struct Entry {
    path: PathBuf,
    is_dir: bool,
    is_symlink: bool,
    metadata: Metadata,
}

impl Entry {
    /// Stat `dent` through any symlink. Dangling or vanished entries are skipped.
    fn stat(dent: &DirEntry, stats: &mut ScanStats) -> Option<Self> {
        let path = dent.path().to_path_buf();
        let is_symlink = dent.path_is_symlink();

        match fs::metadata(&path) {
            Ok(metadata) => Some(Self {
                is_dir: metadata.is_dir(),
                path,
                is_symlink,
                metadata,
            }),
            Err(e) => {
                if is_symlink {
                    debug!(path = ?path, error = %e, "Dangling symlink");
                } else {
                    debug!(path = ?path, error = %e, "Unreadable metadata");
                }
                stats.skipped += 1;
                None
            }
        }
    }
}

/// A directory whose children are still arriving.
struct Frame {
    node: TreeNode,
    children: Vec<TreeNode>,
    unreadable: bool,
}

impl Frame {
    fn new(node: TreeNode) -> Self {
        Self {
            node,
            children: Vec::new(),
            unreadable: false,
        }
    }

    fn finish(self) -> TreeNode {
        let mut children = self.children;
        children.sort_by_cached_key(|n| (n.is_file(), n.name.to_lowercase(), n.name.clone()));

        let mut node = self.node;
        node.kind = NodeKind::Directory {
            children,
            unreadable: self.unreadable,
        };
        node
    }
}

/// Walks a directory tree and assembles [`TreeNode`]s.
pub struct TreeWalker<'a, R: ContentReader = FsContentReader> {
    ignore: &'a IgnorePatternSet,
    options: WalkOptions,
    reader: R,
}

impl<'a> TreeWalker<'a> {
    /// Create a walker that reads content from the filesystem.
    pub fn new(ignore: &'a IgnorePatternSet, options: WalkOptions) -> Self {
        Self::with_reader(ignore, options, FsContentReader)
    }
}

impl<'a, R: ContentReader> TreeWalker<'a, R> {
    /// Create a walker with a custom content reader.
    pub fn with_reader(ignore: &'a IgnorePatternSet, options: WalkOptions, reader: R) -> Self {
        Self {
            ignore,
            options,
            reader,
        }
    }

    /// The content reader in use.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Walk `root`, consulting and updating `cache` when caching is enabled.
    ///
    /// Fails only if `root` does not exist or is not a directory.
    pub fn walk(&self, root: &Path, cache: &mut ScanCache) -> Result<WalkOutput, IndexerError> {
        let start = Instant::now();
        let root = validate_root(root)?;
        let metadata = fs::metadata(&root)?;

        info!(path = ?root, max_depth = ?self.options.max_depth, "Starting walk");

        let mut stats = ScanStats::default();
        let ignored = Arc::new(AtomicU64::new(0));

        let mut top = Frame::new(TreeNode::directory(&root, mtime_secs(&metadata)));
        self.apply_depth_limit(&mut top, 0, &mut stats);
        let mut open: Vec<Frame> = Vec::new();

        for result in self.build_walk(&root, Arc::clone(&ignored)) {
            let dent = match result {
                Ok(dent) => dent,
                Err(e) => {
                    record_walk_error(&e, &mut top, &mut open, &mut stats);
                    continue;
                }
            };

            let depth = dent.depth();
            if depth == 0 {
                continue;
            }
            close_frames(&mut top, &mut open, depth);

            let Some(entry) = Entry::stat(&dent, &mut stats) else {
                continue;
            };

            if entry.is_dir {
                let mut frame = Frame::new(self.visit_directory(&entry, cache, &mut stats));
                if entry.is_symlink {
                    trace!(path = ?entry.path, "Linked directory not expanded");
                } else {
                    self.apply_depth_limit(&mut frame, depth, &mut stats);
                }
                open.push(frame);
            } else {
                let node = self.visit_file(&entry, cache, &mut stats);
                parent(&mut top, &mut open).children.push(node);
            }
        }

        close_frames(&mut top, &mut open, 1);
        stats.skipped += ignored.load(Ordering::Relaxed);
        let tree = top.finish();

        let duration = start.elapsed();

        info!(
            files = stats.files,
            dirs = stats.dirs,
            skipped = stats.skipped,
            cache_hits = stats.cache_hits,
            duration_ms = duration.as_millis(),
            "Walk complete"
        );

        Ok(WalkOutput {
            tree,
            stats,
            duration_ms: duration.as_millis() as u64,
        })
    }

    /// Plain depth-first traversal; every built-in filter is disabled.
    fn build_walk(&self, root: &Path, ignored: Arc<AtomicU64>) -> ignore::Walk {
        let patterns = self.ignore.clone();

        WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .max_depth(self.options.max_depth)
            .filter_entry(move |dent| {
                if patterns.is_ignored(dent.path()) {
                    trace!(path = ?dent.path(), "Ignored");
                    ignored.fetch_add(1, Ordering::Relaxed);
                    false
                } else {
                    true
                }
            })
            .build()
    }

    /// Count the entries of a directory the walk will not expand.
    fn apply_depth_limit(&self, frame: &mut Frame, depth: usize, stats: &mut ScanStats) {
        let Some(max) = self.options.max_depth else {
            return;
        };
        if depth < max {
            return;
        }

        match fs::read_dir(&frame.node.path) {
            Ok(entries) => {
                let hidden = entries.count() as u64;
                trace!(path = %frame.node.path, hidden, "Depth limit reached");
                stats.skipped += hidden;
            }
            Err(e) => {
                debug!(path = %frame.node.path, error = %e, "Cannot list directory");
                frame.unreadable = true;
                stats.skipped += 1;
            }
        }
    }

    fn visit_directory(
        &self,
        entry: &Entry,
        cache: &mut ScanCache,
        stats: &mut ScanStats,
    ) -> TreeNode {
        let key = entry.path.to_string_lossy().into_owned();
        let mtime = mtime_secs(&entry.metadata);

        // A directory's mtime does not track nested content, so a hit only
        // reuses the directory's own record; its children are always revisited.
        let cached = self
            .lookup(cache, &key, mtime)
            .filter(|n| n.is_directory())
            .map(TreeNode::shallow);
        let node = self.count_lookup(cached, stats, || TreeNode::directory(&entry.path, mtime));

        stats.record(&node);
        if self.options.use_cache {
            cache.put(key, mtime, node.shallow());
        }
        node
    }

    fn visit_file(&self, entry: &Entry, cache: &mut ScanCache, stats: &mut ScanStats) -> TreeNode {
        let key = entry.path.to_string_lossy().into_owned();
        let mtime = mtime_secs(&entry.metadata);

        let want_summary = !self.options.omit_content;
        let cached = self
            .lookup(cache, &key, mtime)
            .filter(|n| n.is_file() && n.summary().is_some() == want_summary)
            .cloned();
        let node = self.count_lookup(cached, stats, || self.build_file(entry, mtime));

        stats.record(&node);
        if self.options.use_cache {
            cache.put(key, mtime, node.clone());
        }
        node
    }

    fn lookup<'c>(&self, cache: &'c ScanCache, key: &str, mtime: f64) -> Option<&'c TreeNode> {
        if self.options.use_cache {
            cache.get_fresh(key, mtime)
        } else {
            None
        }
    }

    /// Use the cached node if present, otherwise build a fresh one.
    fn count_lookup(
        &self,
        cached: Option<TreeNode>,
        stats: &mut ScanStats,
        build: impl FnOnce() -> TreeNode,
    ) -> TreeNode {
        match cached {
            Some(node) => {
                trace!(path = %node.path, "Cache hit");
                stats.cache_hits += 1;
                node
            }
            None => {
                if self.options.use_cache {
                    stats.cache_misses += 1;
                }
                build()
            }
        }
    }

    fn build_file(&self, entry: &Entry, mtime: f64) -> TreeNode {
        let summary = if self.options.omit_content {
            None
        } else {
            let summary =
                summary::summarize_file(&self.reader, &entry.path, self.options.window_bytes);
            if let summary::Summary::Error { message } = &summary {
                debug!(path = ?entry.path, error = %message, "Content not summarized");
            }
            Some(summary)
        };

        TreeNode::file(&entry.path, mtime, entry.metadata.len(), summary)
    }
}

/// Innermost open directory, falling back to the root.
fn parent<'f>(top: &'f mut Frame, open: &'f mut [Frame]) -> &'f mut Frame {
    match open.last_mut() {
        Some(frame) => frame,
        None => top,
    }
}

/// Finish open directories until the innermost one can parent an entry at `depth`.
fn close_frames(top: &mut Frame, open: &mut Vec<Frame>, depth: usize) {
    while open.len() >= depth {
        let Some(frame) = open.pop() else {
            break;
        };
        let node = frame.finish();
        parent(top, open).children.push(node);
    }
}

/// Count a traversal error and flag the directory it belongs to.
fn record_walk_error(
    err: &ignore::Error,
    top: &mut Frame,
    open: &mut [Frame],
    stats: &mut ScanStats,
) {
    stats.skipped += 1;

    let path = error_path(err);
    debug!(path = ?path, error = %err, "Cannot list directory");

    if let Some(path) = path {
        let owner = open
            .iter_mut()
            .rev()
            .chain(std::iter::once(top))
            .find(|f| Path::new(&f.node.path) == path);
        if let Some(frame) = owner {
            frame.unreadable = true;
        }
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

/// Walk `root` with the filesystem reader.
///
/// Convenience wrapper returning the tree and its statistics.
pub fn walk(
    root: &Path,
    ignore: &IgnorePatternSet,
    max_depth: Option<usize>,
    use_cache: bool,
    cache: &mut ScanCache,
    omit_content: bool,
) -> Result<(TreeNode, ScanStats), IndexerError> {
    let options = WalkOptions {
        max_depth,
        use_cache,
        omit_content,
        ..Default::default()
    };
    let output = TreeWalker::new(ignore, options).walk(root, cache)?;
    Ok((output.tree, output.stats))
}

/// Canonical form of a scan root, which must be an existing directory.
pub fn validate_root(root: &Path) -> Result<PathBuf, IndexerError> {
    let canonical = root
        .canonicalize()
        .map_err(|_| IndexerError::NotFound(root.to_path_buf()))?;
    if !canonical.is_dir() {
        return Err(IndexerError::NotADirectory(canonical));
    }
    Ok(canonical)
}
