//! Cleaned table type

use crate::decode::RawTable;
use arrow::array::ArrayRef;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

/// A table after normalization, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    batch: RecordBatch,
}

impl CleanedTable {
    pub(crate) fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
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

    /// Look a column up by its (lower-case) name
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }
}

impl From<CleanedTable> for RawTable {
    fn from(table: CleanedTable) -> Self {
        RawTable::new(table.batch)
    }
}
