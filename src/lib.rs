//! A Rust library for selecting subjects from a face-image dataset by
//! demographic attributes and materializing their image folders.

pub mod assign;
pub mod attributes;
pub mod config;
pub mod error;
pub mod filter;
pub mod materialize;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use attributes::{AttributeTable, load_attributes};
pub use config::FilterConfig;
pub use error::{ExtractError, Result};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Pipeline stages
pub use assign::assign_demographics;
pub use filter::{SelectionStats, filter_record_batch, filter_subjects};
pub use materialize::{CopyOutcome, PersonCopyResult, materialize};

// Utility functions
pub use utils::{DEFAULT_BATCH_SIZE, normalize_person, validate_directory};
