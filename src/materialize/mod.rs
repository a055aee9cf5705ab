//! Folder materialization for selected subjects.
//!
//! Copies each selected person's image folder from the source tree into
//! the destination tree. A pre-existing destination folder is merged into
//! rather than replaced; a missing source folder is skipped. Failures are
//! isolated per person: every outcome is recorded and logged, and the
//! batch always runs to completion.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::utils::normalize_person;
use crate::utils::progress::{create_main_progress_bar, finish_progress_bar};
use crate::utils::validate_directory;

/// Per-subject materialization result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyOutcome {
    /// Destination did not exist; the folder was copied fresh
    Copied,
    /// Destination existed; source contents were merged into it
    Merged,
    /// No source folder found for this person
    SkippedMissingSource,
    /// Copy or merge failed; the batch continued with the next person
    Failed(String),
}

/// One person's materialization outcome
#[derive(Debug, Clone, Serialize)]
pub struct PersonCopyResult {
    /// The person identifier as it appears in the attribute table
    pub person: String,
    /// The normalized folder name used on disk
    pub folder: String,
    /// What happened for this person
    pub outcome: CopyOutcome,
}

/// Copy the selected person folders into the destination tree
///
/// # Arguments
/// * `src_root` - Source directory containing one folder per person
/// * `dst_root` - Destination directory; created (with parents) if absent
/// * `selected_persons` - Person identifiers whose folders to materialize
///
/// # Returns
/// One `PersonCopyResult` per selected person, in input order
///
/// # Errors
/// Returns an error if `src_root` is not a directory or `dst_root` cannot
/// be created. Per-person copy failures are NOT errors; they are recorded
/// in the returned outcomes and logged.
pub fn materialize(
    src_root: &Path,
    dst_root: &Path,
    selected_persons: &[String],
) -> Result<Vec<PersonCopyResult>> {
    validate_directory(src_root)?;

    // Created once, before any per-person work
    fs::create_dir_all(dst_root)?;

    let pb = create_main_progress_bar(
        selected_persons.len() as u64,
        Some("Copying person folders"),
    );

    let mut results = Vec::with_capacity(selected_persons.len());
    for person in selected_persons {
        let folder = normalize_person(person);
        let src_path = src_root.join(&folder);
        let dst_path = dst_root.join(&folder);

        let outcome = if !src_path.exists() {
            log::warn!("Source folder not found: {}", src_path.display());
            CopyOutcome::SkippedMissingSource
        } else if dst_path.exists() {
            log::warn!("Destination folder exists, merging: {}", dst_path.display());
            match merge_dir_into(&src_path, &dst_path) {
                Ok(()) => {
                    log::info!("Successfully merged {folder} into {}", dst_path.display());
                    CopyOutcome::Merged
                }
                Err(e) => {
                    log::error!("Failed to merge {folder}: {e}");
                    CopyOutcome::Failed(e.to_string())
                }
            }
        } else {
            log::info!("Copying folder: {folder}");
            match copy_dir_all(&src_path, &dst_path) {
                Ok(()) => CopyOutcome::Copied,
                Err(e) => {
                    log::error!("Failed to copy {folder}: {e}");
                    CopyOutcome::Failed(e.to_string())
                }
            }
        };

        results.push(PersonCopyResult {
            person: person.clone(),
            folder,
            outcome,
        });
        pb.inc(1);
    }

    finish_progress_bar(&pb, Some("Folder copy complete"));
    log_outcome_summary(&results);

    Ok(results)
}

/// Recursively copy a directory tree to a destination that must not exist
fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let dst_item = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dst_item)?;
        } else {
            fs::copy(entry.path(), &dst_item)?;
        }
    }
    Ok(())
}

/// Merge the contents of a source directory into an existing destination
///
/// Subdirectories are merged recursively; files are copied over existing
/// files of the same name. Destination entries absent from the source are
/// left in place.
fn merge_dir_into(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let dst_item = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            fs::create_dir_all(&dst_item)?;
            merge_dir_into(&entry.path(), &dst_item)?;
        } else {
            fs::copy(entry.path(), &dst_item)?;
        }
    }
    Ok(())
}

fn log_outcome_summary(results: &[PersonCopyResult]) {
    let mut copied = 0usize;
    let mut merged = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for result in results {
        match result.outcome {
            CopyOutcome::Copied => copied += 1,
            CopyOutcome::Merged => merged += 1,
            CopyOutcome::SkippedMissingSource => skipped += 1,
            CopyOutcome::Failed(_) => failed += 1,
        }
    }
    log::info!(
        "Materialization finished: {copied} copied, {merged} merged, {skipped} skipped (missing source), {failed} failed"
    );
}
