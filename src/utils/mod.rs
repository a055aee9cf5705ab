//! Utility functions shared across the extraction pipeline

use std::path::Path;

use crate::error::{ExtractError, Result};

pub mod progress;

/// Default batch size for reading the attribute record
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Validates that a directory exists and is a directory
///
/// # Arguments
/// * `dir` - The directory path to check
///
/// # Returns
/// `Ok(())` if the directory exists, otherwise an error
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.exists() || !dir.is_dir() {
        return Err(ExtractError::InvalidDirectory(dir.to_path_buf()));
    }
    Ok(())
}

/// Normalize a person identifier into the folder name used on disk
///
/// Source folders are named after the person with spaces replaced by
/// underscores.
#[must_use]
pub fn normalize_person(person: &str) -> String {
    person.replace(' ', "_")
}
