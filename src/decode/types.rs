//! Raw table type

use crate::error::Result;
use arrow::compute::concat_batches;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

/// A fetched table before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    batch: RecordBatch,
}

impl RawTable {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Concatenate batches sharing `schema` into one table
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let batch = concat_batches(&schema, batches)?;
        Ok(Self { batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }
}

impl From<RecordBatch> for RawTable {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}
