//! Raw table fetchers
//!
//! A `Fetcher` retrieves the raw table for one period:
//!
//! - `WebFetcher`: the gzip CSV published on the releases page
//! - `StorageFetcher`: the cleaned Parquet file previously uploaded to the bucket
//!
//! Both log `Detected N records in dataset` and return the table with its
//! row count. Nothing is retried.

mod storage;
mod web;

pub use storage::StorageFetcher;
pub use web::WebFetcher;

use crate::decode::RawTable;
use crate::error::Result;
use crate::types::PeriodKey;
use async_trait::async_trait;

/// Source of raw tables, one per period
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the table for `period`, returning it with its record count
    async fn fetch(&self, period: &PeriodKey) -> Result<(RawTable, usize)>;
}

#[cfg(test)]
mod tests;
