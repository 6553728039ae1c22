//! Error types for rendering.

use thiserror::Error;

/// Errors that can occur while rendering a report.
#[derive(Error, Debug)]
pub enum RenderError {
    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
