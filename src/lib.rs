// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # taxi-etl
//!
//! Batch ETL for monthly taxi trip records.
//!
//! ## Features
//!
//! - **Web to storage**: download the monthly gzip CSV, normalize it, stage it
//!   as gzip Parquet and upload it to a bucket (GCS, S3, R2, Azure, local)
//! - **Storage to warehouse**: read the Parquet back, normalize it and append
//!   it to `trips_data_all.{service}_taxi` in 100,000-row chunks
//! - **Column normalization**: lower-case names, timestamp, integer and flag
//!   coercions, optional zero-fill of missing passenger counts
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use taxi_etl::{engine::Pipeline, output::ObjectStorage, PeriodKey, PipelineConfig, Service};
//!
//! #[tokio::main]
//! async fn main() -> taxi_etl::Result<()> {
//!     let config = PipelineConfig::load(None)?;
//!     let pipeline = Pipeline::web_to_storage(&config, ObjectStorage::in_memory())?;
//!
//!     let periods = PeriodKey::for_months(Service::Green, 2020, &[1, 2, 3])?;
//!     let report = pipeline.run(&periods, true).await?;
//!     println!("{} rows", report.total_rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                Pipeline::run(periods, remove_missing)         │
//! │        for each period: fetch → normalize → persist           │
//! └───────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴───────┬────────────────────────┐
//! │    Fetcher    │      Normalizer      │       Persister        │
//! ├───────────────┼──────────────────────┼────────────────────────┤
//! │ WebFetcher    │ lower-case names     │ StoragePersister       │
//! │  (HTTP + CSV) │ *datetime* → ts      │  (gzip Parquet + put)  │
//! │ StorageFetcher│ *id/_type/_count→i64 │ WarehousePersister     │
//! │  (get+Parquet)│ *_flag → bool        │  (chunked append)      │
//! └───────────────┴──────────────────────┴────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pipeline
pub mod error;

/// Periods, services and destination naming
pub mod types;

/// Cloud credential providers
pub mod auth;

/// Pipeline configuration
pub mod config;

/// HTTP client for source downloads
pub mod http;

/// CSV and Parquet decoders
pub mod decode;

/// Column normalization rules
pub mod transform;

/// Parquet writing and object storage
pub mod output;

/// Warehouse support via DuckDB
pub mod database;

/// Raw table fetchers
pub mod fetch;

/// Table persisters
pub mod persist;

/// Period driver
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
