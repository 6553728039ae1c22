//! Box-drawing text rendering of a scan report.

use crate::budget::{estimate_tokens, truncate_to_budget};
use crate::size::format_size;
use dirmap_indexer::{NodeKind, ScanReport, Summary, TreeNode};
use tracing::debug;

/// Summary lines shown under each file by default.
pub const DEFAULT_SUMMARY_LINES: usize = 3;

/// Summary lines longer than this are cut with an ellipsis.
const MAX_LINE_CHARS: usize = 120;

const BANNER_WIDTH: usize = 80;

const DENIED_MARKER: &str = "[Permission Denied]";
const ROOT_DENIED_MARKER: &str = "[Permission Denied for Root Directory]";

/// Renderer for the text report.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    /// Maximum summary lines under each file
    summary_lines: usize,
}

impl TextRenderer {
    /// Create a new renderer with default settings.
    pub fn new() -> Self {
        Self {
            summary_lines: DEFAULT_SUMMARY_LINES,
        }
    }

    /// Create a renderer showing up to `lines` summary lines per file.
    pub fn with_summary_lines(lines: usize) -> Self {
        Self {
            summary_lines: lines,
        }
    }

    /// Render the full report: header, totals and tree.
    pub fn render(&self, report: &ScanReport) -> String {
        let banner = "=".repeat(BANNER_WIDTH);
        let mut output = String::new();

        output.push_str(&format!("{}\n", banner));
        output.push_str(&format!(
            "Directory Structure Map: {}\n",
            report.root.display()
        ));
        output.push_str(&format!("{}\n\n", banner));

        output.push_str(&format!("Project Type: {}\n", report.project_type));
        output.push_str(&format!("Total Size: {}\n", format_size(report.stats.size)));
        output.push_str(&format!(
            "Files: {} | Directories: {} | Skipped: {}\n\n",
            report.stats.files, report.stats.dirs, report.stats.skipped
        ));

        output.push_str(&self.render_tree(&report.tree));

        output.push('\n');
        output.push_str(&format!("{}\n", banner));

        output
    }

    /// Render a report, shrinking it to fit `max_tokens` if given.
    ///
    /// Summary lines are dropped first; if the bare tree is still too
    /// large, trailing lines are cut.
    pub fn render_with_budget(&self, report: &ScanReport, max_tokens: Option<usize>) -> String {
        let Some(max_tokens) = max_tokens else {
            return self.render(report);
        };

        let mut text = String::new();
        for lines in (0..=self.summary_lines).rev() {
            text = Self::with_summary_lines(lines).render(report);
            if estimate_tokens(&text) <= max_tokens {
                if lines < self.summary_lines {
                    debug!(summary_lines = lines, max_tokens, "Reduced summaries to fit budget");
                }
                return text;
            }
        }

        debug!(
            tokens = estimate_tokens(&text),
            max_tokens, "Truncating report to fit budget"
        );
        truncate_to_budget(&text, max_tokens)
    }

    /// Render the tree alone, starting with the root line.
    pub fn render_tree(&self, root: &TreeNode) -> String {
        let mut output = format!("{}/ (Root)\n", root.name);
        if root.is_unreadable() {
            output.push_str(&format!("{}\n", ROOT_DENIED_MARKER));
        }
        self.render_children(&mut output, root, "");
        output
    }

    fn render_children(&self, output: &mut String, node: &TreeNode, prefix: &str) {
        let children = node.children();
        let child_count = children.len();

        for (i, child) in children.iter().enumerate() {
            let is_last = i + 1 == child_count;
            let connector = if is_last { "└── " } else { "├── " };
            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

            match &child.kind {
                NodeKind::Directory { .. } => {
                    output.push_str(&format!("{}{}{}/\n", prefix, connector, child.name));
                    if child.is_unreadable() {
                        output.push_str(&format!("{}{}\n", child_prefix, DENIED_MARKER));
                    }
                    self.render_children(output, child, &child_prefix);
                }
                NodeKind::File { size, summary } => {
                    output.push_str(&format!(
                        "{}{}{} ({})\n",
                        prefix,
                        connector,
                        child.name,
                        format_size(*size)
                    ));
                    if let Some(summary) = summary {
                        for line in summary_lines(summary).iter().take(self.summary_lines) {
                            output.push_str(&format!("{}    {}\n", child_prefix, line));
                        }
                    }
                }
            }
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display lines for a summary, most informative first.
pub fn summary_lines(summary: &Summary) -> Vec<String> {
    let lines = match summary {
        Summary::Python {
            imports,
            local_imports,
            definitions,
        } => {
            let mut lines = Vec::new();
            if !imports.is_empty() {
                lines.push(format!("imports: {}", imports.join(", ")));
            }
            if !local_imports.is_empty() {
                lines.push(format!("local imports: {}", local_imports.join(", ")));
            }
            lines.extend(definitions.iter().cloned());
            lines
        }
        Summary::Markdown { headers } => headers.clone(),
        Summary::Generic { preview } => preview
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Summary::Error { message } => vec![format!("[error] {}", message)],
    };

    lines.into_iter().map(|l| clip(&l)).collect()
}

fn clip(line: &str) -> String {
    if line.chars().count() <= MAX_LINE_CHARS {
        return line.to_string();
    }
    let mut clipped: String = line.chars().take(MAX_LINE_CHARS - 1).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirmap_indexer::{ProjectType, ScanStats};
    use std::path::{Path, PathBuf};

    fn file(path: &str, size: u64, summary: Option<Summary>) -> TreeNode {
        TreeNode::file(Path::new(path), 0.0, size, summary)
    }

    fn dir(path: &str, children: Vec<TreeNode>) -> TreeNode {
        let mut node = TreeNode::directory(Path::new(path), 0.0);
        node.kind = NodeKind::Directory {
            children,
            unreadable: false,
        };
        node
    }

    fn sample_report() -> ScanReport {
        let tree = dir(
            "/work/proj",
            vec![
                dir(
                    "/work/proj/sub",
                    vec![file(
                        "/work/proj/sub/b.md",
                        20,
                        Some(Summary::Markdown {
                            headers: vec!["- Title".to_string()],
                        }),
                    )],
                ),
                file(
                    "/work/proj/a.py",
                    1536,
                    Some(Summary::Python {
                        imports: vec!["os".to_string(), "sys".to_string()],
                        local_imports: vec![".util".to_string()],
                        definitions: vec!["def foo(...):".to_string(), "class Bar:".to_string()],
                    }),
                ),
            ],
        );

        ScanReport {
            root: PathBuf::from("/work/proj"),
            project_type: ProjectType::Python,
            tree,
            stats: ScanStats {
                files: 2,
                dirs: 1,
                size: 1556,
                skipped: 1,
                ..Default::default()
            },
            warnings: vec![],
            duration_ms: 0,
        }
    }

    #[test]
    fn test_render_tree_layout() {
        let report = sample_report();
        let out = TextRenderer::new().render_tree(&report.tree);

        let expected = "\
proj/ (Root)
├── sub/
│   └── b.md (20.00 B)
│           - Title
└── a.py (1.50 KB)
        imports: os, sys
        local imports: .util
        def foo(...):
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_unreadable_directory_marker() {
        let mut locked = dir("/work/proj/locked", vec![]);
        locked.kind = NodeKind::Directory {
            children: vec![],
            unreadable: true,
        };
        let tree = dir(
            "/work/proj",
            vec![locked, file("/work/proj/z.txt", 1, None)],
        );

        let out = TextRenderer::new().render_tree(&tree);
        let expected = "\
proj/ (Root)
├── locked/
│   [Permission Denied]
└── z.txt (1.00 B)
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_unreadable_root_marker() {
        let mut root = dir("/work/proj", vec![]);
        root.kind = NodeKind::Directory {
            children: vec![],
            unreadable: true,
        };

        let out = TextRenderer::new().render_tree(&root);
        assert_eq!(
            out,
            "proj/ (Root)\n[Permission Denied for Root Directory]\n"
        );
    }

    #[test]
    fn test_summary_line_limit() {
        let report = sample_report();
        let out = TextRenderer::with_summary_lines(1).render_tree(&report.tree);

        assert!(out.contains("imports: os, sys"));
        assert!(!out.contains("local imports"));
        assert!(!out.contains("def foo"));
    }

    #[test]
    fn test_render_header() {
        let out = TextRenderer::new().render(&sample_report());

        assert!(out.starts_with(&"=".repeat(80)));
        assert!(out.contains("Directory Structure Map: /work/proj"));
        assert!(out.contains("Project Type: Python"));
        assert!(out.contains("Total Size: 1.52 KB"));
        assert!(out.contains("Files: 2 | Directories: 1 | Skipped: 1"));
    }

    #[test]
    fn test_summary_lines_variants() {
        assert_eq!(
            summary_lines(&Summary::error("SyntaxError parsing file.")),
            vec!["[error] SyntaxError parsing file."]
        );
        assert_eq!(
            summary_lines(&Summary::Generic {
                preview: vec!["  a  ".to_string(), "".to_string(), "b".to_string()]
            }),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_long_lines_clipped() {
        let long = "x".repeat(500);
        let lines = summary_lines(&Summary::Generic {
            preview: vec![long],
        });
        assert_eq!(lines[0].chars().count(), MAX_LINE_CHARS);
        assert!(lines[0].ends_with('…'));
    }

    #[test]
    fn test_budget_drops_summaries_first() {
        let report = sample_report();
        let bare = TextRenderer::with_summary_lines(0).render(&report);
        let budget = estimate_tokens(&bare);

        let out = TextRenderer::new().render_with_budget(&report, Some(budget));
        assert_eq!(out, bare);
    }

    #[test]
    fn test_budget_truncates_when_tree_too_large() {
        let report = sample_report();
        let out = TextRenderer::new().render_with_budget(&report, Some(40));

        assert!(estimate_tokens(&out) <= 40);
        assert!(out.contains("truncated to fit ~40 token budget"));
    }

    #[test]
    fn test_no_budget_is_full_render() {
        let report = sample_report();
        let renderer = TextRenderer::new();
        assert_eq!(
            renderer.render_with_budget(&report, None),
            renderer.render(&report)
        );
    }
}
