//! Table persisters
//!
//! A `TablePersister` stores one cleaned table at a period's destination:
//!
//! - `StoragePersister`: gzip Parquet in local staging, then uploaded to the bucket
//! - `WarehousePersister`: appended to the warehouse table in bounded chunks

mod storage;
mod warehouse;

pub use storage::StoragePersister;
pub use warehouse::{WarehousePersister, DEFAULT_CHUNK_SIZE};

use crate::error::Result;
use crate::transform::CleanedTable;
use crate::types::Destination;
use async_trait::async_trait;

/// Sink for cleaned tables
#[async_trait]
pub trait TablePersister: Send + Sync {
    /// Persist `table` at `destination`, returning the number of rows stored
    async fn persist(&self, table: &CleanedTable, destination: &Destination) -> Result<usize>;
}
