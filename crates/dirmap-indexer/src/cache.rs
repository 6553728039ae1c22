//! Modification-time keyed scan cache.
//!
//! A flat map from absolute path to the node computed for it and the
//! modification time it was computed at. An entry is reusable only while
//! the path's current modification time equals the stored one.
//!
//! The store never evicts on its own; [`ScanCache::prune`] removes entries
//! for paths that have disappeared.

use crate::tree::TreeNode;
use crate::IndexerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// File name of the persisted cache inside the scan root.
pub const CACHE_FILE_NAME: &str = ".dirmap_cache.json";

/// A cached node and the modification time it was computed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub mtime: f64,
    pub node: TreeNode,
}

/// In-memory cache with explicit load and save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl ScanCache {
    /// Create an empty in-memory cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a cache file. A missing file yields an empty cache.
    pub fn load(path: &Path) -> Result<Self, IndexerError> {
        if !path.exists() {
            debug!(path = ?path, "No cache file, starting empty");
            return Ok(Self::new());
        }

        let json = fs::read_to_string(path)?;
        let entries: BTreeMap<String, CacheEntry> = serde_json::from_str(&json)?;

        debug!(path = ?path, entries = entries.len(), "Loaded cache");

        Ok(Self { entries })
    }

    /// Persist the cache as a JSON object keyed by path.
    pub fn save(&self, path: &Path) -> Result<(), IndexerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(&self.entries)?;

        // Atomic write: write to temp file, then rename
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = Path::new(&temp_name);
        fs::write(temp_path, &json)?;
        fs::rename(temp_path, path)?;

        debug!(path = ?path, entries = self.entries.len(), size = json.len(), "Saved cache");

        Ok(())
    }

    /// Delete a persisted cache. Deleting a missing cache is not an error.
    pub fn clear(path: &Path) -> Result<(), IndexerError> {
        if path.exists() {
            fs::remove_file(path)?;
            info!(path = ?path, "Cleared cache");
        }
        Ok(())
    }

    /// Look up the entry stored for `key`.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// The cached node for `key` if it was computed at exactly `mtime`.
    pub fn get_fresh(&self, key: &str, mtime: f64) -> Option<&TreeNode> {
        self.entries
            .get(key)
            .filter(|e| e.mtime == mtime)
            .map(|e| &e.node)
    }

    /// Store (or replace) the entry for `key`.
    pub fn put(&mut self, key: impl Into<String>, mtime: f64, node: TreeNode) {
        self.entries.insert(key.into(), CacheEntry { mtime, node });
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries outside `root` or whose path no longer exists.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, root: &Path) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| {
            let path = Path::new(key);
            path.starts_with(root) && fs::symlink_metadata(path).is_ok()
        });
        let removed = before - self.entries.len();

        if removed > 0 {
            debug!(removed = removed, remaining = self.entries.len(), "Pruned cache");
        }

        removed
    }
}
