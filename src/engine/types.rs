//! Engine types
//!
//! Pipeline variants and the reports produced by a run.

use crate::types::PeriodKey;
use serde::Serialize;
use std::fmt;

/// Which pair of fetcher and persister a pipeline wires together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    /// Web CSV → gzip Parquet in object storage
    WebToStorage,
    /// Object storage Parquet → warehouse table
    StorageToWarehouse,
}

impl PipelineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineKind::WebToStorage => "web-to-storage",
            PipelineKind::StorageToWarehouse => "storage-to-warehouse",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodReport {
    /// The period processed
    pub period: PeriodKey,
    /// Records detected by the fetcher
    pub fetched: usize,
    /// Rows written by the persister
    pub persisted: usize,
}

/// Statistics from a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Pipeline variant that produced the report
    pub kind: PipelineKind,
    /// Per-period results, in processing order
    pub periods: Vec<PeriodReport>,
    /// Sum of persisted rows over all periods
    pub total_rows: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    /// Create an empty report
    pub fn new(kind: PipelineKind) -> Self {
        Self {
            kind,
            periods: Vec::new(),
            total_rows: 0,
            duration_ms: 0,
        }
    }

    /// Record a finished period
    pub fn add_period(&mut self, report: PeriodReport) {
        self.total_rows += report.persisted;
        self.periods.push(report);
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
