//! CLI module
//!
//! Command-line interface for running the pipelines.
//!
//! # Commands
//!
//! - `web-to-storage` - Web CSV to gzip Parquet in the bucket
//! - `storage-to-warehouse` - Bucket Parquet to warehouse tables
//! - `backfill` - web-to-storage over whole years and services
//! - `plan` - Show where each period would be read from and written to

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, PeriodArgs};
pub use runner::{backfill_periods, Runner};
