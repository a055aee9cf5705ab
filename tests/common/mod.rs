use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use faceset_extract::AttributeTable;
use faceset_extract::attributes::{AGE_GROUPS, ETHNICITIES};

/// Build an attribute table with a `person` column and every indicator
/// column. `rows` holds one entry per row: the person identifier and the
/// indicator values keyed in the order Child, Youth, Middle Aged, Senior,
/// Asian, White, Black.
#[must_use]
pub fn table(rows: &[(&str, [f64; 7])]) -> AttributeTable {
    let mut fields = vec![Field::new("person", DataType::Utf8, true)];
    let persons: Vec<&str> = rows.iter().map(|(person, _)| *person).collect();
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(persons))];

    for (i, name) in AGE_GROUPS.iter().chain(&ETHNICITIES).enumerate() {
        fields.push(Field::new(*name, DataType::Float64, true));
        let values: Vec<f64> = rows.iter().map(|(_, scores)| scores[i]).collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
    AttributeTable::new(batch)
}

/// Indicator row with every score non-positive
#[must_use]
pub fn no_scores() -> [f64; 7] {
    [0.0; 7]
}

/// Indicator row builder: (age index, age score, ethnicity index, score)
///
/// Age indexes follow `AGE_GROUPS` order, ethnicity indexes `ETHNICITIES`
/// order.
#[must_use]
pub fn scores(age: usize, age_score: f64, ethnicity: usize, ethnicity_score: f64) -> [f64; 7] {
    let mut row = [0.0; 7];
    row[age] = age_score;
    row[4 + ethnicity] = ethnicity_score;
    row
}
