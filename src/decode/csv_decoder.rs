//! CSV decoder
//!
//! Reads a header-first CSV payload, gunzipping it first when the payload
//! starts with the gzip magic bytes. Every column is read as Utf8 by the
//! Arrow CSV reader and then narrowed: all non-empty cells parse as `i64` →
//! Int64, else as `f64` → Float64, else Utf8. Empty cells are null and a
//! column with no values at all is Float64.
//!
//! Rows shorter than the header are padded with nulls. A row longer than the
//! header is a parse error.

use super::types::RawTable;
use crate::error::{Error, Result};
use arrow::array::{new_null_array, Array, ArrayRef};
use arrow::compute::{cast_with_options, concat_batches, CastOptions};
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use flate2::read::MultiGzDecoder;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Rows per batch handed out by the Arrow CSV reader
const BATCH_SIZE: usize = 64 * 1024;

/// CSV decoder with configurable delimiter
#[derive(Debug, Clone)]
pub struct CsvDecoder {
    /// Field delimiter
    delimiter: u8,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvDecoder {
    /// Create a new CSV decoder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a CSV decoder with a custom delimiter
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Whether a payload looks gzip-compressed
    pub fn is_gzip(body: &[u8]) -> bool {
        body.starts_with(&GZIP_MAGIC)
    }

    /// Decode a (possibly gzip-compressed) CSV payload
    pub fn decode(&self, body: &[u8]) -> Result<RawTable> {
        if Self::is_gzip(body) {
            debug!("Payload is gzip-compressed ({} bytes)", body.len());
            self.decode_reader(MultiGzDecoder::new(body))
        } else {
            self.decode_slice(body)
        }
    }

    /// Decode CSV from any reader
    pub fn decode_reader<R: Read>(&self, mut reader: R) -> Result<RawTable> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| parse_error(format!("failed to read payload: {e}")))?;
        self.decode_slice(&data)
    }

    fn decode_slice(&self, data: &[u8]) -> Result<RawTable> {
        let headers = self.read_headers(data)?;

        let fields: Vec<Field> = headers
            .iter()
            .map(|name| Field::new(name, DataType::Utf8, true))
            .collect();
        let string_schema = Arc::new(Schema::new(fields));

        let reader = ReaderBuilder::new(Arc::clone(&string_schema))
            .with_header(true)
            .with_delimiter(self.delimiter)
            .with_truncated_rows(true)
            .with_batch_size(BATCH_SIZE)
            .build(Cursor::new(data))
            .map_err(csv_error)?;

        let batches = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(csv_error)?;
        let strings = concat_batches(&string_schema, &batches)?;
        drop(batches);

        let row_count = strings.num_rows();
        let mut fields = Vec::with_capacity(headers.len());
        let mut columns = Vec::with_capacity(headers.len());
        for (name, column) in headers.into_iter().zip(strings.columns()) {
            let array = narrow_column(column);
            fields.push(Field::new(name, array.data_type().clone(), true));
            columns.push(array);
        }

        debug!("Decoded {row_count} rows, {} columns", columns.len());

        let options = RecordBatchOptions::new().with_row_count(Some(row_count));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)?;
        Ok(RawTable::new(batch))
    }

    /// Column names from the first record
    fn read_headers(&self, data: &[u8]) -> Result<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(data);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| parse_error(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(parse_error("payload has no header row"));
        }
        Ok(headers)
    }
}

fn parse_error(message: impl Into<String>) -> Error {
    Error::CsvParse {
        message: message.into(),
    }
}

fn csv_error(e: ArrowError) -> Error {
    parse_error(e.to_string())
}

/// Narrow a Utf8 column to the smallest of Int64, Float64 and Utf8 holding every value
fn narrow_column(strings: &ArrayRef) -> ArrayRef {
    if !strings.is_empty() && strings.null_count() == strings.len() {
        return new_null_array(&DataType::Float64, strings.len());
    }

    let strict = CastOptions {
        safe: false,
        ..CastOptions::default()
    };
    for target in [DataType::Int64, DataType::Float64] {
        if let Ok(array) = cast_with_options(strings.as_ref(), &target, &strict) {
            return array;
        }
    }
    Arc::clone(strings)
}
