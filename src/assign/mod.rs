//! Demographic assignment from indicator scores.
//!
//! Each row of the attribute table carries one numeric score per age
//! group and per ethnicity. This module reduces each group to a single
//! label: the column with the highest strictly-positive score, scanning
//! the columns in their declared order. Because a column wins only by
//! strictly exceeding the running maximum, ties resolve to the first
//! column in declared order.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;

use crate::attributes::{AGE_GROUPS, AttributeTable, ETHNICITIES, indicator_column};
use crate::error::Result;

/// Derived column holding the assigned age group label
pub const ASSIGNED_AGE_COLUMN: &str = "assigned_age_group";

/// Derived column holding the assigned ethnicity label
pub const ASSIGNED_ETHNICITY_COLUMN: &str = "assigned_ethnicity";

/// Assign an age group and an ethnicity to every row of the table
///
/// The input table is not modified; the result is a copy with the
/// `assigned_age_group` and `assigned_ethnicity` columns appended. Rows
/// with no strictly-positive score in a group get a null label for that
/// group.
///
/// # Errors
/// Returns a schema error if an indicator column is missing or not numeric
pub fn assign_demographics(table: &AttributeTable) -> Result<AttributeTable> {
    let batch = table.batch();

    let age_labels = max_positive_labels(batch, &AGE_GROUPS)?;
    let ethnicity_labels = max_positive_labels(batch, &ETHNICITIES)?;

    let mut fields: Vec<FieldRef> = batch.schema().fields().iter().cloned().collect();
    fields.push(Arc::new(Field::new(ASSIGNED_AGE_COLUMN, DataType::Utf8, true)));
    fields.push(Arc::new(Field::new(
        ASSIGNED_ETHNICITY_COLUMN,
        DataType::Utf8,
        true,
    )));

    let mut columns = batch.columns().to_vec();
    columns.push(Arc::new(StringArray::from(age_labels)) as ArrayRef);
    columns.push(Arc::new(StringArray::from(ethnicity_labels)) as ArrayRef);

    let augmented = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    Ok(AttributeTable::new(augmented))
}

/// For each row, pick the first column (in `columns` order) holding the
/// strict running maximum among values greater than zero
///
/// Null cells count as non-positive. Returns one label per row, `None`
/// when no column had a positive value.
fn max_positive_labels<'a>(
    batch: &RecordBatch,
    columns: &[&'a str],
) -> Result<Vec<Option<&'a str>>> {
    let arrays: Vec<&Float64Array> = columns
        .iter()
        .map(|name| indicator_column(batch, name))
        .collect::<Result<_>>()?;

    let mut labels = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let mut max_value = f64::NEG_INFINITY;
        let mut assigned = None;

        for (name, array) in columns.iter().zip(&arrays) {
            if array.is_null(row) {
                continue;
            }
            let value = array.value(row);
            if value > 0.0 && value > max_value {
                max_value = value;
                assigned = Some(*name);
            }
        }

        labels.push(assigned);
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_with(column: &str, values: Vec<Option<f64>>) -> RecordBatch {
        let field = Field::new(column, DataType::Float64, true);
        RecordBatch::try_new(
            Arc::new(Schema::new(vec![field])),
            vec![Arc::new(Float64Array::from(values)) as ArrayRef],
        )
        .unwrap()
    }

    fn two_column_batch(a: (&str, Vec<f64>), b: (&str, Vec<f64>)) -> RecordBatch {
        RecordBatch::try_new(
            Arc::new(Schema::new(vec![
                Field::new(a.0, DataType::Float64, true),
                Field::new(b.0, DataType::Float64, true),
            ])),
            vec![
                Arc::new(Float64Array::from(a.1)) as ArrayRef,
                Arc::new(Float64Array::from(b.1)) as ArrayRef,
            ],
        )
        .unwrap()
    }

    #[test]
    fn picks_maximum_positive_value() {
        let batch = two_column_batch(("Child", vec![0.2, 0.9]), ("Youth", vec![0.8, 0.1]));
        let labels = max_positive_labels(&batch, &["Child", "Youth"]).unwrap();
        assert_eq!(labels, vec![Some("Youth"), Some("Child")]);
    }

    #[test]
    fn ties_resolve_to_first_declared_column() {
        let batch = two_column_batch(("Child", vec![0.5]), ("Youth", vec![0.5]));
        let labels = max_positive_labels(&batch, &["Child", "Youth"]).unwrap();
        assert_eq!(labels, vec![Some("Child")]);

        // The tie-break follows declaration order, not column order in the batch
        let labels = max_positive_labels(&batch, &["Youth", "Child"]).unwrap();
        assert_eq!(labels, vec![Some("Youth")]);
    }

    #[test]
    fn non_positive_values_yield_no_label() {
        let batch = two_column_batch(("Child", vec![0.0, -0.3]), ("Youth", vec![-1.0, 0.0]));
        let labels = max_positive_labels(&batch, &["Child", "Youth"]).unwrap();
        assert_eq!(labels, vec![None, None]);
    }

    #[test]
    fn null_cells_count_as_non_positive() {
        let batch = batch_with("Child", vec![None, Some(0.4)]);
        let labels = max_positive_labels(&batch, &["Child"]).unwrap();
        assert_eq!(labels, vec![None, Some("Child")]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let batch = batch_with("Child", vec![Some(1.0)]);
        assert!(max_positive_labels(&batch, &["Child", "Youth"]).is_err());
    }
}
