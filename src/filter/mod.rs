//! Subject filtering over the assigned attribute table.
//!
//! Filtering builds one boolean mask per condition (ethnicity equality,
//! age group membership), combines them with a logical AND, and collects
//! the distinct person identifiers of the surviving rows. A person is
//! selected if ANY single row jointly satisfies both conditions; rows are
//! never combined across conditions.

use arrow::array::{Array, ArrayRef, BooleanArray, StringArray};
use arrow::compute::{and, filter as arrow_filter};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::assign::{ASSIGNED_AGE_COLUMN, ASSIGNED_ETHNICITY_COLUMN};
use crate::attributes::{AttributeTable, person_column};
use crate::config::FilterConfig;
use crate::error::{ExtractError, Result};

/// Statistics about a filtering run
///
/// All four counts are distinct-person counts, reproducible from the same
/// rows and masks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionStats {
    /// Distinct persons in the whole table
    pub total_persons: usize,
    /// Distinct persons selected by the combined conditions
    pub selected_persons: usize,
    /// Distinct persons matching the ethnicity condition alone
    pub ethnicity_persons: usize,
    /// Distinct persons matching the age condition alone
    pub age_persons: usize,
}

impl SelectionStats {
    /// Log the statistics at info level
    pub fn log(&self, ethnicity: &str) {
        log::info!("Total persons: {}", self.total_persons);
        log::info!("Matching criteria: {}", self.selected_persons);
        log::info!("{ethnicity} persons: {}", self.ethnicity_persons);
        log::info!("Age range persons: {}", self.age_persons);
    }
}

/// Filter persons based on the ethnicity and age group conditions
///
/// # Arguments
/// * `table` - The attribute table, after demographic assignment
/// * `config` - The filter configuration
///
/// # Returns
/// The set of selected person identifiers and the selection statistics.
/// Repeated calls on the same input yield the same result.
///
/// # Errors
/// Returns a validation error if the configuration names unknown columns
/// or if the table is missing the assigned label columns
pub fn filter_subjects(
    table: &AttributeTable,
    config: &FilterConfig,
) -> Result<(FxHashSet<String>, SelectionStats)> {
    config.validate(&table.column_names())?;

    if !table.has_column(ASSIGNED_ETHNICITY_COLUMN) || !table.has_column(ASSIGNED_AGE_COLUMN) {
        return Err(ExtractError::Validation(format!(
            "Data must contain '{ASSIGNED_ETHNICITY_COLUMN}' and '{ASSIGNED_AGE_COLUMN}' columns"
        )));
    }

    let batch = table.batch();
    let ethnicity_mask = label_equals_mask(batch, ASSIGNED_ETHNICITY_COLUMN, &config.ethnicity)?;
    let age_mask = label_in_mask(batch, ASSIGNED_AGE_COLUMN, &config.ages)?;
    let final_mask = and(&ethnicity_mask, &age_mask)?;

    let selected_rows = filter_record_batch(batch, &final_mask)?;
    let selected = distinct_persons(person_column(&selected_rows)?, None);

    let persons = person_column(batch)?;
    let stats = SelectionStats {
        total_persons: distinct_persons(persons, None).len(),
        selected_persons: selected.len(),
        ethnicity_persons: distinct_persons(persons, Some(&ethnicity_mask)).len(),
        age_persons: distinct_persons(persons, Some(&age_mask)).len(),
    };
    stats.log(&config.ethnicity);

    Ok((selected, stats))
}

/// Build a mask that is true where the label column equals `value`
///
/// Null labels never match.
fn label_equals_mask(batch: &RecordBatch, column: &str, value: &str) -> Result<BooleanArray> {
    let labels = label_column(batch, column)?;

    let mut mask = Vec::with_capacity(labels.len());
    for i in 0..labels.len() {
        mask.push(!labels.is_null(i) && labels.value(i) == value);
    }

    Ok(BooleanArray::from(mask))
}

/// Build a mask that is true where the label column value is a member of
/// `allowed`
fn label_in_mask(batch: &RecordBatch, column: &str, allowed: &[String]) -> Result<BooleanArray> {
    let labels = label_column(batch, column)?;
    let allowed: FxHashSet<&str> = allowed.iter().map(String::as_str).collect();

    let mut mask = Vec::with_capacity(labels.len());
    for i in 0..labels.len() {
        mask.push(!labels.is_null(i) && allowed.contains(labels.value(i)));
    }

    Ok(BooleanArray::from(mask))
}

fn label_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| ExtractError::Validation(format!("Column '{name}' not found")))?;

    column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ExtractError::Validation(format!("Column '{name}' is not a string column")))
}

/// Collect the distinct person identifiers, optionally restricted to rows
/// where `mask` is true
fn distinct_persons(persons: &StringArray, mask: Option<&BooleanArray>) -> FxHashSet<String> {
    let mut distinct = FxHashSet::default();
    for i in 0..persons.len() {
        if persons.is_null(i) {
            continue;
        }
        if mask.is_some_and(|m| !m.value(i)) {
            continue;
        }
        distinct.insert(persons.value(i).to_string());
    }
    distinct
}

/// Filter a record batch based on a boolean mask
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
///
/// # Returns
/// A new record batch with only rows where mask is true
///
/// # Errors
/// Returns an error if the mask length does not match the batch or if a
/// column cannot be filtered
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(ExtractError::Validation(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<arrow::error::Result<_>>()?;

    Ok(RecordBatch::try_new(batch.schema(), filtered_columns)?)
}
