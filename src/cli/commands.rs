//! CLI commands and argument parsing

use crate::error::Result;
use crate::types::{PeriodKey, Service};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Batch ETL for monthly taxi trip records
#[derive(Parser, Debug)]
#[command(name = "taxi-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download monthly CSV files, normalize them and upload gzip Parquet to the bucket
    WebToStorage {
        #[command(flatten)]
        periods: PeriodArgs,

        /// Replace missing passenger counts with 0
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        remove_missing: bool,
    },

    /// Read Parquet files from the bucket, normalize them and append to the warehouse
    StorageToWarehouse {
        #[command(flatten)]
        periods: PeriodArgs,

        /// Replace missing passenger counts with 0
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        remove_missing: bool,
    },

    /// Run web-to-storage for every month of several years and services
    Backfill {
        /// Years to load (comma-separated)
        #[arg(long, value_delimiter = ',', default_values_t = [2019, 2020])]
        years: Vec<i32>,

        /// Services to load (comma-separated)
        #[arg(long, value_delimiter = ',', default_values_t = Service::ALL)]
        services: Vec<Service>,

        /// Replace missing passenger counts with 0
        #[arg(long, default_value_t = false, action = ArgAction::Set)]
        remove_missing: bool,
    },

    /// Print the source URL, staging path, object key and table of each period
    Plan {
        #[command(flatten)]
        periods: PeriodArgs,
    },
}

/// One service, one year, a list of months
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Taxi service
    #[arg(long)]
    pub service: Service,

    /// Year of the monthly files
    #[arg(long)]
    pub year: i32,

    /// Months to process (comma-separated, 1-12)
    #[arg(long, value_delimiter = ',', required = true)]
    pub months: Vec<u32>,
}

impl PeriodArgs {
    /// Expand into period keys, in the order given
    pub fn periods(&self) -> Result<Vec<PeriodKey>> {
        PeriodKey::for_months(self.service, self.year, &self.months)
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
