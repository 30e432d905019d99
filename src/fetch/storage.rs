//! Fetch cleaned Parquet files back from object storage

use super::Fetcher;
use crate::decode::{read_parquet, RawTable};
use crate::error::Result;
use crate::output::ObjectStorage;
use crate::types::PeriodKey;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Downloads `{folder}/{file}.parquet` to the local staging path and reads it
#[derive(Debug, Clone)]
pub struct StorageFetcher {
    storage: ObjectStorage,
    local_root: PathBuf,
}

impl StorageFetcher {
    pub fn new(storage: ObjectStorage, local_root: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            local_root: local_root.into(),
        }
    }
}

#[async_trait]
impl Fetcher for StorageFetcher {
    async fn fetch(&self, period: &PeriodKey) -> Result<(RawTable, usize)> {
        let destination = period.destination();
        let local = destination.local_path(&self.local_root);

        self.storage
            .download(&destination.object_key(), &local)
            .await?;
        let table = read_parquet(&local)?;

        let count = table.num_rows();
        info!("Detected {count} records in dataset");
        Ok((table, count))
    }
}
