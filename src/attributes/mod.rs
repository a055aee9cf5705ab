//! Attribute record loading and validation.
//!
//! The attribute record is a tab-separated text file with one row per
//! image sample. The first physical line holds a row-count marker and is
//! skipped; the second line is the column header. The table is read into
//! an Arrow record batch, validated against the required columns, and
//! the indicator columns are normalized to `Float64`.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::compute::{cast, concat_batches};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::error::{ExtractError, Result};
use crate::utils::DEFAULT_BATCH_SIZE;

/// Column holding the subject identifier
pub const PERSON_COLUMN: &str = "person";

/// Age indicator columns, in tie-break priority order
pub const AGE_GROUPS: [&str; 4] = ["Child", "Youth", "Middle Aged", "Senior"];

/// Ethnicity indicator columns, in tie-break priority order
pub const ETHNICITIES: [&str; 3] = ["Asian", "White", "Black"];

/// In-memory attribute table, one row per image sample
///
/// Wraps a single Arrow record batch; all batches produced by the reader
/// are concatenated at load time. Additional columns beyond the required
/// ones are tolerated and ignored.
#[derive(Debug, Clone)]
pub struct AttributeTable {
    batch: RecordBatch,
}

impl AttributeTable {
    /// Create a table from an existing record batch
    #[must_use]
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// The underlying record batch
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of data rows in the table
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the table contains a column with the given name
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().field_with_name(name).is_ok()
    }

    /// The set of column names available in the table
    #[must_use]
    pub fn column_names(&self) -> FxHashSet<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }
}

/// Access the person identifier column of a batch as a string array
///
/// # Errors
/// Returns a schema error if the column is missing or not a string column
pub fn person_column(batch: &RecordBatch) -> Result<&StringArray> {
    let column = batch.column_by_name(PERSON_COLUMN).ok_or_else(|| {
        ExtractError::Schema(format!("Column '{PERSON_COLUMN}' not found in attribute table"))
    })?;

    column.as_any().downcast_ref::<StringArray>().ok_or_else(|| {
        ExtractError::Schema(format!("Column '{PERSON_COLUMN}' is not a string column"))
    })
}

/// Access a numeric indicator column of a batch as a `Float64` array
///
/// # Errors
/// Returns a schema error if the column is missing or not `Float64`
pub fn indicator_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| ExtractError::Schema(format!("Column '{name}' not found in attribute table")))?;

    column
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| ExtractError::Schema(format!("Column '{name}' is not a Float64 column")))
}

/// Load and parse the attribute record
///
/// # Arguments
/// * `path` - Path to the tab-separated attribute file
///
/// # Returns
/// The validated attribute table
///
/// # Errors
/// Returns `NotFound` if the path does not exist, `Parse` for any other
/// read or decode failure, and `Schema` if required columns are missing
pub fn load_attributes(path: &Path) -> Result<AttributeTable> {
    if !path.exists() {
        log::error!("Attribute file not found: {}", path.display());
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let mut raw = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut raw))
        .map_err(|e| parse_error(path, &e))?;

    // The first physical line is a row-count marker, not data; the header
    // starts on the second line.
    let header_start = raw
        .iter()
        .position(|&b| b == b'\n')
        .map_or(raw.len(), |i| i + 1);
    let mut cursor = Cursor::new(&raw[header_start..]);

    let format = Format::default().with_header(true).with_delimiter(b'\t');
    let (schema, _) = format
        .infer_schema(&mut cursor, None)
        .map_err(|e| parse_error(path, &e))?;
    cursor.rewind().map_err(|e| parse_error(path, &e))?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(Arc::clone(&schema))
        .with_format(format)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build(cursor)
        .map_err(|e| parse_error(path, &e))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| parse_error(path, &e))?;
    let batch = concat_batches(&schema, &batches).map_err(|e| parse_error(path, &e))?;

    validate_required_columns(&batch)?;
    let batch = normalize_indicator_columns(&batch)?;

    log::info!(
        "Successfully loaded attributes from {} ({} rows, {} columns)",
        path.display(),
        batch.num_rows(),
        batch.num_columns()
    );

    Ok(AttributeTable::new(batch))
}

fn parse_error(path: &Path, cause: &dyn std::fmt::Display) -> ExtractError {
    log::error!("Error reading attribute file {}: {cause}", path.display());
    ExtractError::Parse(format!("{}: {cause}", path.display()))
}

/// Check that the person column and every indicator column are present,
/// and that the person column holds strings
fn validate_required_columns(batch: &RecordBatch) -> Result<()> {
    let schema = batch.schema();

    let missing: Vec<&str> = std::iter::once(PERSON_COLUMN)
        .chain(AGE_GROUPS)
        .chain(ETHNICITIES)
        .filter(|name| schema.field_with_name(name).is_err())
        .collect();

    if !missing.is_empty() {
        return Err(ExtractError::Schema(format!(
            "Missing required columns: {}",
            missing.iter().join(", ")
        )));
    }

    let person_field = schema.field_with_name(PERSON_COLUMN)?;
    if person_field.data_type() != &DataType::Utf8 {
        return Err(ExtractError::Schema(format!(
            "Column '{PERSON_COLUMN}' must hold string identifiers, found {}",
            person_field.data_type()
        )));
    }

    Ok(())
}

/// Cast every indicator column to `Float64` so downstream stages read a
/// single numeric type regardless of what the reader inferred
fn normalize_indicator_columns(batch: &RecordBatch) -> Result<RecordBatch> {
    let indicators: FxHashSet<&str> = AGE_GROUPS.iter().chain(&ETHNICITIES).copied().collect();

    let mut fields: Vec<FieldRef> = Vec::with_capacity(batch.num_columns());
    let mut columns = Vec::with_capacity(batch.num_columns());

    for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
        if indicators.contains(field.name().as_str()) && field.data_type() != &DataType::Float64 {
            columns.push(cast(column.as_ref(), &DataType::Float64)?);
            fields.push(Arc::new(Field::new(
                field.name().as_str(),
                DataType::Float64,
                true,
            )));
        } else {
            columns.push(Arc::clone(column));
            fields.push(Arc::clone(field));
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
