//! Output module
//!
//! Handles Parquet file writing and object storage transfers.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing Arrow RecordBatches to (gzip) Parquet files
//! - Uploading and downloading objects (GCS, S3, R2, Azure, in-memory, local)

mod storage;
mod writer;

pub use storage::ObjectStorage;
pub use writer::{write_batch_to_parquet, ParquetWriter, ParquetWriterConfig};

#[cfg(test)]
mod tests;
