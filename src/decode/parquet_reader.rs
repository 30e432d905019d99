//! Parquet reader

use super::types::RawTable;
use crate::error::{Error, Result};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use std::fs::File;
use std::path::Path;

/// Read a whole Parquet file into one raw table
pub fn read_parquet(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::local_io(path, e))?;
    read_chunks(file)
}

/// Read an in-memory Parquet payload into one raw table
pub fn read_parquet_bytes(data: Bytes) -> Result<RawTable> {
    read_chunks(data)
}

fn read_chunks<T: ChunkReader + 'static>(input: T) -> Result<RawTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input)?;
    let schema = builder.schema().clone();
    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    RawTable::from_batches(schema, &batches)
}
