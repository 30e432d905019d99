//! Column normalization
//!
//! Turns a `RawTable` into a `CleanedTable`:
//!
//! 1. every column name is lower-cased
//! 2. `*datetime*` columns are parsed as timestamps
//! 3. `*id`, `*_type`, `*_count` columns become nullable Int64
//! 4. `*_flag` columns become nullable Boolean (`y/yes` → true, `n/no` → false)
//! 5. with `remove_missing`, nulls in `passenger_count` become 0
//!
//! Rules 2-4 are an ordered list and every matching rule is applied to a
//! column, in that order. Values that do not coerce become null; only
//! structural problems are errors.

mod coerce;
mod rules;
mod types;

pub use rules::{matching_rules, Coercion, Rule, RULES};
pub use types::CleanedTable;

use crate::decode::RawTable;
use crate::error::{Error, Result};
use arrow::array::{Array, ArrayRef};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Column whose nulls are zero-filled when missing values are removed
pub const PASSENGER_COUNT: &str = "passenger_count";

/// Apply the naming and type rules to a raw table
pub fn normalize(raw: &RawTable, remove_missing: bool) -> Result<CleanedTable> {
    let batch = raw.batch();
    let schema = batch.schema();

    let mut seen = HashSet::new();
    let mut fields: Vec<Field> = Vec::with_capacity(batch.num_columns());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name().to_lowercase();
        if !seen.insert(name.clone()) {
            return Err(Error::schema(format!(
                "column '{}' collides with another column once lower-cased",
                field.name()
            )));
        }

        let mut array = Arc::clone(column);
        for rule in matching_rules(&name) {
            debug!(column = %name, rule = rule.name(), "Applying rule");
            array = rule.apply(&name, &array);
        }

        fields.push(Field::new(name, array.data_type().clone(), true));
        columns.push(array);
    }

    if remove_missing {
        let idx = fields
            .iter()
            .position(|f| f.name() == PASSENGER_COUNT)
            .ok_or_else(|| Error::schema(format!("missing required column '{PASSENGER_COUNT}'")))?;

        info!(
            "Missing passenger count before transformation: {}",
            columns[idx].null_count()
        );
        columns[idx] = coerce::fill_nulls_with_zero(&columns[idx]);
        fields[idx] = Field::new(PASSENGER_COUNT, columns[idx].data_type().clone(), true);
        info!(
            "Missing passenger count after transformation: {}",
            columns[idx].null_count()
        );
    }

    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    let cleaned =
        RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;
    Ok(CleanedTable::new(cleaned))
}
