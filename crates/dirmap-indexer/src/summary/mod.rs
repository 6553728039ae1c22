//! Per-file content summaries.
//!
//! A file's content is read through a bounded window and reduced to a
//! small synopsis whose shape depends on the file extension. Summarizing
//! never fails: any read or parse problem becomes [`Summary::Error`].

mod markdown;
mod python;
mod reader;

pub use reader::{ContentReader, FsContentReader, DEFAULT_WINDOW_BYTES};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of lines kept in a generic preview.
pub const PREVIEW_LINES: usize = 5;

/// Message attached to Python files that fail to parse.
pub const SYNTAX_ERROR_MESSAGE: &str = "SyntaxError parsing file.";

/// Synopsis of a single file's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Summary {
    /// Python module: imports and top-level definitions
    Python {
        imports: Vec<String>,
        local_imports: Vec<String>,
        definitions: Vec<String>,
    },

    /// Markdown or plain text: heading outline
    Markdown { headers: Vec<String> },

    /// Any other file: the first few lines
    Generic { preview: Vec<String> },

    /// Content could not be read or parsed
    Error { message: String },
}

impl Summary {
    /// Build an error summary.
    pub fn error(message: impl Into<String>) -> Self {
        Summary::Error {
            message: message.into(),
        }
    }

    /// Check if this is an error summary.
    pub fn is_error(&self) -> bool {
        matches!(self, Summary::Error { .. })
    }
}

/// Summary shape selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Python,
    Markdown,
    Generic,
}

impl SummaryKind {
    /// Select the summary shape for an extension (without the leading dot).
    pub fn for_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "py" | "pyi" | "pyw" => SummaryKind::Python,
            "md" | "markdown" | "txt" => SummaryKind::Markdown,
            _ => SummaryKind::Generic,
        }
    }

    /// Select the summary shape for a path.
    pub fn for_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::for_extension)
            .unwrap_or(SummaryKind::Generic)
    }
}

/// Summarize already-read content lines for a file with the given extension.
pub fn summarize(extension: &str, lines: &[String]) -> Summary {
    match SummaryKind::for_extension(extension) {
        SummaryKind::Python => python::summarize(&lines.join("\n")),
        SummaryKind::Markdown => Summary::Markdown {
            headers: markdown::headers(lines),
        },
        SummaryKind::Generic => Summary::Generic {
            preview: lines.iter().take(PREVIEW_LINES).cloned().collect(),
        },
    }
}

/// Read a file's bounded window through `reader` and summarize it.
pub fn summarize_file<R: ContentReader + ?Sized>(
    reader: &R,
    path: &Path,
    window_bytes: usize,
) -> Summary {
    match reader.read_window(path, window_bytes) {
        Ok(lines) => {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            summarize(ext, &lines)
        }
        Err(e) => Summary::error(reader::describe_read_error(&e)),
    }
}
