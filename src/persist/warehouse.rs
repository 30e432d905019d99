//! Persist to the warehouse in bounded chunks

use super::TablePersister;
use crate::database::{TableName, Warehouse};
use crate::error::Result;
use crate::transform::CleanedTable;
use crate::types::Destination;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum rows per append request unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Appends every row of a table to `{dataset}.{service}_taxi`
#[derive(Clone)]
pub struct WarehousePersister {
    warehouse: Arc<dyn Warehouse>,
    chunk_size: usize,
}

impl WarehousePersister {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self {
            warehouse,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the maximum rows per append (at least 1)
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl std::fmt::Debug for WarehousePersister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehousePersister")
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TablePersister for WarehousePersister {
    async fn persist(&self, table: &CleanedTable, destination: &Destination) -> Result<usize> {
        let target = TableName::parse(destination.table_name())?;
        let batch = table.batch();
        let total = batch.num_rows();

        let mut appended = 0;
        let mut offset = 0;
        while offset < total {
            let len = self.chunk_size.min(total - offset);
            appended += self
                .warehouse
                .append_rows(&target, &batch.slice(offset, len))
                .await?;
            debug!("Appended rows {offset}..{} to {target}", offset + len);
            offset += len;
        }

        info!("Appended {appended} rows to {target}");
        Ok(appended)
    }
}
