//! Tree structure produced by a scan.
//!
//! Directories own their children directly; there are no parent links,
//! so a tree is always traversed top-down.

use crate::summary::Summary;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// A node in the scanned directory tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Base name of the entry
    pub name: String,

    /// Absolute path of the entry
    pub path: String,

    /// Modification time in seconds since the Unix epoch
    pub mtime: f64,

    /// Kind-specific data
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Kind of tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    /// Directory with its ordered children
    Directory {
        children: Vec<TreeNode>,
        /// Set when the directory could not be listed
        #[serde(default, skip_serializing_if = "is_false")]
        unreadable: bool,
    },

    /// Regular file
    File {
        /// File size in bytes
        size: u64,
        /// Content synopsis, absent when content was omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<Summary>,
    },
}

impl TreeNode {
    /// Create a directory node without children.
    pub fn directory(path: &Path, mtime: f64) -> Self {
        Self {
            name: node_name(path),
            path: path.to_string_lossy().into_owned(),
            mtime,
            kind: NodeKind::Directory {
                children: Vec::new(),
                unreadable: false,
            },
        }
    }

    /// Create a file node.
    pub fn file(path: &Path, mtime: f64, size: u64, summary: Option<Summary>) -> Self {
        Self {
            name: node_name(path),
            path: path.to_string_lossy().into_owned(),
            mtime,
            kind: NodeKind::File { size, summary },
        }
    }

    /// Check if this is a directory node.
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Check if this is a file node.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    /// Children of a directory (empty for files).
    pub fn children(&self) -> &[TreeNode] {
        match &self.kind {
            NodeKind::Directory { children, .. } => children,
            NodeKind::File { .. } => &[],
        }
    }

    /// Check if this is a directory whose entries could not be listed.
    pub fn is_unreadable(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Directory {
                unreadable: true,
                ..
            }
        )
    }

    /// File size in bytes (`None` for directories).
    pub fn size(&self) -> Option<u64> {
        match &self.kind {
            NodeKind::File { size, .. } => Some(*size),
            NodeKind::Directory { .. } => None,
        }
    }

    /// File summary, if one was computed.
    pub fn summary(&self) -> Option<&Summary> {
        match &self.kind {
            NodeKind::File { summary, .. } => summary.as_ref(),
            NodeKind::Directory { .. } => None,
        }
    }

    /// A copy of this node without children, as stored in the cache.
    pub fn shallow(&self) -> TreeNode {
        match &self.kind {
            NodeKind::Directory { .. } => TreeNode {
                name: self.name.clone(),
                path: self.path.clone(),
                mtime: self.mtime,
                kind: NodeKind::Directory {
                    children: Vec::new(),
                    unreadable: false,
                },
            },
            NodeKind::File { .. } => self.clone(),
        }
    }

}

/// Aggregate counters for a single scan.
///
/// Counters only ever grow during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Number of files in the tree
    pub files: u64,
    /// Number of directories in the tree, excluding the root
    pub dirs: u64,
    /// Total size of all files in bytes
    pub size: u64,
    /// Entries left out of the tree (ignored, too deep, unreadable)
    pub skipped: u64,
    /// Nodes reused from the cache
    #[serde(skip)]
    pub cache_hits: u64,
    /// Nodes computed fresh while caching was enabled
    #[serde(skip)]
    pub cache_misses: u64,
}

impl ScanStats {
    /// Count a node of the given kind.
    pub(crate) fn record(&mut self, node: &TreeNode) {
        match &node.kind {
            NodeKind::Directory { .. } => self.dirs += 1,
            NodeKind::File { size, .. } => {
                self.files += 1;
                self.size += size;
            }
        }
    }
}

/// Modification time of an entry as fractional seconds since the Unix epoch.
///
/// Returns 0.0 when the platform does not report a modification time.
pub fn mtime_secs(metadata: &Metadata) -> f64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn node_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_tree() -> TreeNode {
        let mut root = TreeNode::directory(&PathBuf::from("/project"), 1.0);
        let file = TreeNode::file(
            &PathBuf::from("/project/a.py"),
            2.5,
            42,
            Some(Summary::Generic {
                preview: vec!["x = 1".to_string()],
            }),
        );
        let sub = TreeNode::directory(&PathBuf::from("/project/sub"), 3.0);
        if let NodeKind::Directory { children, .. } = &mut root.kind {
            children.push(sub);
            children.push(file);
        }
        root
    }

    #[test]
    fn test_node_is_methods() {
        let dir = TreeNode::directory(&PathBuf::from("/p/src"), 0.0);
        let file = TreeNode::file(&PathBuf::from("/p/main.rs"), 0.0, 100, None);

        assert!(dir.is_directory());
        assert!(!dir.is_file());
        assert_eq!(dir.name, "src");
        assert!(file.is_file());
        assert_eq!(file.size(), Some(100));
        assert_eq!(dir.size(), None);
    }

    #[test]
    fn test_serialization_shape() {
        let tree = sample_tree();
        let value = serde_json::to_value(&tree).unwrap();

        assert_eq!(value["type"], "directory");
        assert_eq!(value["name"], "project");
        let children = value["children"].as_array().unwrap();
        assert_eq!(children[0]["type"], "directory");
        assert_eq!(children[1]["type"], "file");
        assert_eq!(children[1]["size"], 42);
        assert_eq!(children[1]["summary"]["kind"], "generic");
    }

    #[test]
    fn test_file_without_summary_omits_field() {
        let file = TreeNode::file(&PathBuf::from("/p/a.bin"), 0.0, 1, None);
        let value = serde_json::to_value(&file).unwrap();
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let parsed: TreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, parsed);
    }

    #[test]
    fn test_shallow_drops_children() {
        let tree = sample_tree();
        let shallow = tree.shallow();
        assert!(shallow.children().is_empty());
        assert_eq!(shallow.path, tree.path);
    }

    #[test]
    fn test_unreadable_flag_serialization() {
        let tree = sample_tree();
        let value = serde_json::to_value(&tree).unwrap();
        assert!(value.get("unreadable").is_none());

        let mut locked = TreeNode::directory(&PathBuf::from("/project/locked"), 0.0);
        locked.kind = NodeKind::Directory {
            children: Vec::new(),
            unreadable: true,
        };
        let value = serde_json::to_value(&locked).unwrap();
        assert_eq!(value["unreadable"], true);
        assert!(locked.is_unreadable());
        assert!(!locked.shallow().is_unreadable());

        let parsed: TreeNode = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, locked);
    }

    #[test]
    fn test_stats_record() {
        let mut stats = ScanStats::default();
        stats.record(&TreeNode::file(&PathBuf::from("/a"), 0.0, 10, None));
        stats.record(&TreeNode::directory(&PathBuf::from("/b"), 0.0));
        assert_eq!(stats.files, 1);
        assert_eq!(stats.dirs, 1);
        assert_eq!(stats.size, 10);
    }
}
