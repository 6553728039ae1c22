//! Dirmap Indexer
//!
//! This crate provides the incremental directory indexer for dirmap, including:
//! - Exclusion rules from explicit patterns, defaults and `.gitignore` chains
//! - Per-file content summaries (Python via tree-sitter, markdown outlines)
//! - A modification-time keyed cache persisted between runs
//! - Depth-bounded, ignore-aware tree walking with scan statistics

pub mod cache;
mod error;
pub mod ignore_rules;
pub mod project;
pub mod session;
pub mod summary;
pub mod tree;
pub mod walker;

pub use cache::{CacheEntry, ScanCache, CACHE_FILE_NAME};
pub use error::IndexerError;
pub use ignore_rules::IgnorePatternSet;
pub use project::{detect_project_type, ProjectType};
pub use session::{ScanOptions, ScanReport, Scanner};
pub use summary::{ContentReader, FsContentReader, Summary};
pub use tree::{NodeKind, ScanStats, TreeNode};
pub use walker::{TreeWalker, WalkOptions, WalkOutput};
