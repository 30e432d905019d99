//! Raw table decoders
//!
//! Supports: CSV (optionally gzip-compressed), Parquet
//!
//! # Overview
//!
//! Decoders turn a fetched payload into a `RawTable`: an Arrow record batch
//! whose column types are whatever the payload suggests. No naming or type
//! rules are applied here; that is the normalizer's job.

mod csv_decoder;
mod parquet_reader;
mod types;

pub use csv_decoder::CsvDecoder;
pub use parquet_reader::{read_parquet, read_parquet_bytes};
pub use types::RawTable;
