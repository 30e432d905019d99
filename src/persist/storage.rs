//! Persist to object storage through local staging

use super::TablePersister;
use crate::error::{Error, Result};
use crate::output::{write_batch_to_parquet, ObjectStorage, ParquetWriterConfig};
use crate::transform::CleanedTable;
use crate::types::Destination;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `{local_root}/{folder}/{file}.parquet` and uploads it to `{folder}/{file}.parquet`
///
/// The staged file stays on disk after the upload, successful or not.
#[derive(Debug, Clone)]
pub struct StoragePersister {
    storage: ObjectStorage,
    local_root: PathBuf,
    writer: ParquetWriterConfig,
}

impl StoragePersister {
    pub fn new(storage: ObjectStorage, local_root: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            local_root: local_root.into(),
            writer: ParquetWriterConfig::default(),
        }
    }

    /// Override the Parquet writer settings (gzip by default)
    #[must_use]
    pub fn with_writer_config(mut self, writer: ParquetWriterConfig) -> Self {
        self.writer = writer;
        self
    }

    fn write_local(&self, table: &CleanedTable, path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::local_io(parent, e))?;
        }
        let rows = write_batch_to_parquet(path, table.batch(), Some(&self.writer))?;
        info!("Wrote {rows} rows to {}", path.display());
        Ok(rows)
    }
}

#[async_trait]
impl TablePersister for StoragePersister {
    async fn persist(&self, table: &CleanedTable, destination: &Destination) -> Result<usize> {
        let path = destination.local_path(&self.local_root);
        let rows = self.write_local(table, &path)?;
        self.storage
            .upload(&path, &destination.object_key())
            .await?;
        Ok(rows)
    }
}
