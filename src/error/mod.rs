//! Error handling for the extraction pipeline.

use std::path::PathBuf;

use arrow::error::ArrowError;

/// Specialized error type for the extraction pipeline
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Attribute file does not exist on disk
    #[error("Attribute file not found: {0}")]
    NotFound(PathBuf),

    /// Attribute file could not be read or parsed
    #[error("Failed to parse attribute file: {0}")]
    Parse(String),

    /// Required columns are missing from the attribute table
    #[error("Schema error: {0}")]
    Schema(String),

    /// Filter configuration does not match the available columns
    #[error("Validation error: {0}")]
    Validation(String),

    /// Source root does not exist or is not a directory
    #[error("Invalid source directory: {0}")]
    InvalidDirectory(PathBuf),

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Result type for extraction pipeline operations
pub type Result<T> = std::result::Result<T, ExtractError>;
