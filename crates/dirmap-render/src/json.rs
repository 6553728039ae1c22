//! JSON rendering of a scan report.

use crate::budget::estimate_tokens;
use crate::error::Result;
use chrono::{DateTime, Utc};
use dirmap_indexer::{NodeKind, ScanReport, ScanStats, TreeNode};
use serde::Serialize;
use std::borrow::Cow;
use tracing::warn;

/// Serialized shape of a report.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub project_type: &'a str,
    pub generated_at: DateTime<Utc>,
    pub stats: &'a ScanStats,
    pub tree: Cow<'a, TreeNode>,
}

impl<'a> JsonReport<'a> {
    /// Build a report view borrowing from `report`.
    pub fn new(report: &'a ScanReport) -> Self {
        Self {
            project_type: report.project_type.name(),
            generated_at: Utc::now(),
            stats: &report.stats,
            tree: Cow::Borrowed(&report.tree),
        }
    }

    /// Remove every file summary from the tree.
    pub fn without_summaries(mut self) -> Self {
        strip_summaries(self.tree.to_mut());
        self
    }
}

/// Render `report` as pretty-printed JSON.
///
/// When the output exceeds `max_tokens`, summaries are dropped. The
/// structure itself is never cut, so the result may still be over budget.
pub fn render_json(report: &ScanReport, max_tokens: Option<usize>) -> Result<String> {
    let view = JsonReport::new(report);
    let output = serde_json::to_string_pretty(&view)?;

    let Some(max_tokens) = max_tokens else {
        return Ok(output);
    };
    if estimate_tokens(&output) <= max_tokens {
        return Ok(output);
    }

    let output = serde_json::to_string_pretty(&view.without_summaries())?;
    let tokens = estimate_tokens(&output);
    if tokens > max_tokens {
        warn!(tokens, max_tokens, "JSON report exceeds token budget");
    }
    Ok(output)
}

fn strip_summaries(node: &mut TreeNode) {
    match &mut node.kind {
        NodeKind::Directory { children, .. } => children.iter_mut().for_each(strip_summaries),
        NodeKind::File { summary, .. } => *summary = None,
    }
}
