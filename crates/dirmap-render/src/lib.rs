//! Dirmap Render
//!
//! Turns a scan report into text or JSON suitable for pasting into
//! prompts, with an optional token budget.

mod budget;
mod error;
mod json;
mod size;
mod text;

pub use budget::{estimate_tokens, truncate_to_budget};
pub use error::{RenderError, Result};
pub use json::{render_json, JsonReport};
pub use size::format_size;
pub use text::{summary_lines, TextRenderer, DEFAULT_SUMMARY_LINES};

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
