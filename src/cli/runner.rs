//! CLI runner - executes commands

use crate::auth::{CredentialProvider, Credentials, EnvCredentials, StaticCredentials};
use crate::cli::commands::{Cli, Commands, OutputFormat, PeriodArgs};
use crate::config::PipelineConfig;
use crate::database::DuckDbWarehouse;
use crate::engine::{validate_periods, Pipeline, RunReport};
use crate::error::Result;
use crate::output::ObjectStorage;
use crate::types::{Destination, PeriodKey, Service};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::WebToStorage {
                periods,
                remove_missing,
            } => {
                self.web_to_storage(&periods.periods()?, *remove_missing)
                    .await
            }
            Commands::StorageToWarehouse {
                periods,
                remove_missing,
            } => {
                self.storage_to_warehouse(&periods.periods()?, *remove_missing)
                    .await
            }
            Commands::Backfill {
                years,
                services,
                remove_missing,
            } => {
                self.web_to_storage(&backfill_periods(years, services)?, *remove_missing)
                    .await
            }
            Commands::Plan { periods } => self.plan(periods),
        }
    }

    /// Load the pipeline configuration (file, then environment)
    fn load_config(&self) -> Result<PipelineConfig> {
        PipelineConfig::load(self.cli.config.as_deref())
    }

    /// Open the configured bucket
    fn open_storage(config: &PipelineConfig) -> Result<ObjectStorage> {
        let provider: Box<dyn CredentialProvider> = match &config.storage.credentials {
            Credentials::Environment if config.storage.url.starts_with("gs://") => {
                Box::new(EnvCredentials::new())
            }
            other => Box::new(StaticCredentials::new(other.clone())),
        };
        ObjectStorage::parse(&config.storage.url, provider.as_ref())
    }

    async fn web_to_storage(&self, periods: &[PeriodKey], remove_missing: bool) -> Result<()> {
        let config = self.load_config()?;
        let storage = Self::open_storage(&config)?;
        let pipeline = Pipeline::web_to_storage(&config, storage)?;

        let report = pipeline.run(periods, remove_missing).await?;
        self.output_report(&report);
        Ok(())
    }

    async fn storage_to_warehouse(
        &self,
        periods: &[PeriodKey],
        remove_missing: bool,
    ) -> Result<()> {
        let config = self.load_config()?;
        let storage = Self::open_storage(&config)?;
        let warehouse = Arc::new(DuckDbWarehouse::from_config(&config)?);
        let pipeline = Pipeline::storage_to_warehouse(&config, storage, warehouse);

        let report = pipeline.run(periods, remove_missing).await?;
        self.output_report(&report);
        Ok(())
    }

    /// Print destination descriptors without touching the network or storage
    fn plan(&self, args: &PeriodArgs) -> Result<()> {
        let config = self.load_config()?;
        let periods = args.periods()?;
        validate_periods(&periods)?;

        for period in &periods {
            let destination = Destination::new(period, &config.warehouse.dataset);
            self.output_message(&json!({
                "type": "PLAN",
                "period": period.to_string(),
                "source_url": destination.source_url(&config.source.base_url),
                "local_path": destination.local_path(&config.local_root),
                "object_key": destination.object_key(),
                "storage_uri": format!(
                    "{}/{}",
                    config.storage.url.trim_end_matches('/'),
                    destination.object_key()
                ),
                "table": destination.table_name(),
            }));
        }
        Ok(())
    }

    fn output_report(&self, report: &RunReport) {
        let mut msg = serde_json::to_value(report).unwrap_or_default();
        if let Value::Object(ref mut fields) = msg {
            fields.insert("type".to_string(), json!("REPORT"));
        }
        self.output_message(&msg);
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Every month of every (year, service), skipping services not published that year
pub fn backfill_periods(years: &[i32], services: &[Service]) -> Result<Vec<PeriodKey>> {
    let months: Vec<u32> = (1..=12).collect();
    let mut periods = Vec::new();

    for &year in years {
        for &service in services {
            if !service.is_published_for(year) {
                info!("Skipping {service} {year}: not published");
                continue;
            }
            periods.extend(PeriodKey::for_months(service, year, &months)?);
        }
    }
    Ok(periods)
}
