//! Error types for article parsing and presentation rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning an article into a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// The article file does not exist.
    #[error("Article not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP archive error (for PPTX output).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML generation or parsing error (for PPTX output).
    #[error("XML error: {0}")]
    XmlError(String),

    /// Invalid renderer configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to lay out or write a slide.
    #[error("Render error: {0}")]
    RenderError(String),
}
