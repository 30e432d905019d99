//! Execution engine module
//!
//! The period driver: for each requested period, in order,
//! fetch → normalize → persist.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Pipeline` - a fetcher and a persister wired to run over periods
//! - `PipelineKind` - the two supported variants
//! - `RunReport` - per-period and total row counts of a run
//!
//! The first failing stage aborts the run. Periods completed before the
//! failure stay persisted; nothing is rolled back or retried.

mod types;

pub use types::{PeriodReport, PipelineKind, RunReport};

use crate::config::PipelineConfig;
use crate::database::Warehouse;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, StorageFetcher, WebFetcher};
use crate::output::ObjectStorage;
use crate::persist::{StoragePersister, TablePersister, WarehousePersister};
use crate::transform::normalize;
use crate::types::{Destination, PeriodKey, DEFAULT_DATASET};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// A fetcher and persister pair driven over a list of periods
pub struct Pipeline {
    kind: PipelineKind,
    fetcher: Box<dyn Fetcher>,
    persister: Box<dyn TablePersister>,
    dataset: String,
}

impl Pipeline {
    /// Create a pipeline from its parts
    pub fn new(
        kind: PipelineKind,
        fetcher: Box<dyn Fetcher>,
        persister: Box<dyn TablePersister>,
    ) -> Self {
        Self {
            kind,
            fetcher,
            persister,
            dataset: DEFAULT_DATASET.to_string(),
        }
    }

    /// Target a different warehouse dataset
    #[must_use]
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    /// Web CSV → normalized gzip Parquet in object storage
    pub fn web_to_storage(config: &PipelineConfig, storage: ObjectStorage) -> Result<Self> {
        let fetcher = WebFetcher::from_config(&config.source)?;
        let persister = StoragePersister::new(storage, &config.local_root);
        Ok(Self::new(
            PipelineKind::WebToStorage,
            Box::new(fetcher),
            Box::new(persister),
        )
        .with_dataset(&config.warehouse.dataset))
    }

    /// Object storage Parquet → normalized rows appended to the warehouse
    pub fn storage_to_warehouse(
        config: &PipelineConfig,
        storage: ObjectStorage,
        warehouse: Arc<dyn Warehouse>,
    ) -> Self {
        let fetcher = StorageFetcher::new(storage, &config.local_root);
        let persister =
            WarehousePersister::new(warehouse).with_chunk_size(config.warehouse.chunk_size);
        Self::new(
            PipelineKind::StorageToWarehouse,
            Box::new(fetcher),
            Box::new(persister),
        )
        .with_dataset(&config.warehouse.dataset)
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    /// Destination of a period under this pipeline's dataset
    pub fn destination(&self, period: &PeriodKey) -> Destination {
        Destination::new(period, &self.dataset)
    }

    /// Process every period in order and report the rows persisted
    pub async fn run(&self, periods: &[PeriodKey], remove_missing: bool) -> Result<RunReport> {
        validate_periods(periods)?;

        let start = Instant::now();
        let mut report = RunReport::new(self.kind);

        info!(
            "Starting {} for {} period(s) (remove_missing={remove_missing})",
            self.kind,
            periods.len()
        );

        for period in periods {
            let period_report = self.run_period(period, remove_missing).await?;
            info!("{period}: {} rows", period_report.persisted);
            report.add_period(period_report);
        }

        report.set_duration(start.elapsed().as_millis() as u64);
        info!("Total rows count: {}", report.total_rows);
        Ok(report)
    }

    async fn run_period(&self, period: &PeriodKey, remove_missing: bool) -> Result<PeriodReport> {
        let destination = self.destination(period);

        let (raw, fetched) = self.fetcher.fetch(period).await?;
        let cleaned = normalize(&raw, remove_missing)?;
        let persisted = self.persister.persist(&cleaned, &destination).await?;

        Ok(PeriodReport {
            period: *period,
            fetched,
            persisted,
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("kind", &self.kind)
            .field("dataset", &self.dataset)
            .finish_non_exhaustive()
    }
}

/// Reject period lists that name the same period twice
pub fn validate_periods(periods: &[PeriodKey]) -> Result<()> {
    let mut seen = HashSet::with_capacity(periods.len());
    for period in periods {
        if !seen.insert(period) {
            return Err(Error::invalid_value(
                "periods",
                format!("{period} is listed more than once"),
            ));
        }
    }
    Ok(())
}
