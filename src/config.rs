//! Pipeline configuration
//!
//! One `PipelineConfig` is resolved at process start (YAML file, then
//! environment overrides) and handed to each component's constructor.
//!
//! ```yaml
//! local_root: /tmp/datasets
//! project_id: my-project
//! source:
//!   base_url: https://github.com/DataTalksClub/nyc-tlc-data/releases/download
//! storage:
//!   url: gs://taxi-data-homework
//!   credentials:
//!     type: service_account_file
//!     path: /keys/sa.json
//! warehouse:
//!   path: /tmp/datasets/warehouse.duckdb
//!   dataset: trips_data_all
//!   chunk_size: 100000
//! ```

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::persist::DEFAULT_CHUNK_SIZE;
use crate::types::DEFAULT_DATASET;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Overrides `local_root`
pub const ENV_LOCAL_ROOT: &str = "TAXI_ETL_LOCAL_ROOT";
/// Overrides `project_id`
pub const ENV_PROJECT_ID: &str = "TAXI_ETL_PROJECT_ID";
/// Overrides `storage.url`
pub const ENV_BUCKET_URL: &str = "TAXI_ETL_BUCKET_URL";
/// Overrides `warehouse.path`
pub const ENV_WAREHOUSE_PATH: &str = "TAXI_ETL_WAREHOUSE_PATH";
/// Overrides `source.base_url`
pub const ENV_SOURCE_BASE_URL: &str = "TAXI_ETL_SOURCE_BASE_URL";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory for local staging files
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,

    /// Warehouse project identifier
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Remote CSV source
    #[serde(default)]
    pub source: SourceConfig,

    /// Object storage bucket
    #[serde(default)]
    pub storage: StorageConfig,

    /// Warehouse target
    #[serde(default)]
    pub warehouse: WarehouseConfig,
}

fn default_local_root() -> PathBuf {
    PathBuf::from("/tmp/datasets")
}

fn default_project_id() -> String {
    "taxi-etl".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            local_root: default_local_root(),
            project_id: default_project_id(),
            source: SourceConfig::default(),
            storage: StorageConfig::default(),
            warehouse: WarehouseConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from an optional YAML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_LOCAL_ROOT) {
            self.local_root = PathBuf::from(root);
        }
        if let Some(project) = lookup(ENV_PROJECT_ID) {
            self.project_id = project;
        }
        if let Some(url) = lookup(ENV_BUCKET_URL) {
            self.storage.url = url;
        }
        if let Some(path) = lookup(ENV_WAREHOUSE_PATH) {
            self.warehouse.path = PathBuf::from(path);
        }
        if let Some(base) = lookup(ENV_SOURCE_BASE_URL) {
            self.source.base_url = base;
        }
        debug!(?self, "Resolved pipeline configuration");
        self
    }

    /// Check values that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(Error::invalid_value("project_id", "must not be empty"));
        }
        if self.storage.url.trim().is_empty() {
            return Err(Error::invalid_value("storage.url", "must not be empty"));
        }
        if self.warehouse.chunk_size == 0 {
            return Err(Error::invalid_value(
                "warehouse.chunk_size",
                "must be greater than zero",
            ));
        }
        url::Url::parse(&self.source.base_url)?;
        Ok(())
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Where raw monthly CSV files are downloaded from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Releases base URL; files live at `{base_url}/{service}/{file}.csv.gz`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://github.com/DataTalksClub/nyc-tlc-data/releases/download".to_string()
}

fn default_timeout() -> u64 {
    300
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// ============================================================================
// Storage Config
// ============================================================================

/// Object storage bucket holding cleaned Parquet files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket URL (`gs://`, `s3://`, `az://`, `memory://` or a local path)
    #[serde(default = "default_bucket_url")]
    pub url: String,

    /// Credentials used to open the bucket
    #[serde(default)]
    pub credentials: Credentials,
}

fn default_bucket_url() -> String {
    "gs://taxi-data-homework".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: default_bucket_url(),
            credentials: Credentials::default(),
        }
    }
}

// ============================================================================
// Warehouse Config
// ============================================================================

/// Warehouse target for appended trip rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Database file (`:memory:` for a throwaway warehouse)
    #[serde(default = "default_warehouse_path")]
    pub path: PathBuf,

    /// Dataset (schema) receiving the per-service tables
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Maximum rows per append request
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_warehouse_path() -> PathBuf {
    PathBuf::from("/tmp/datasets/warehouse.duckdb")
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            path: default_warehouse_path(),
            dataset: default_dataset(),
            chunk_size: default_chunk_size(),
        }
    }
}
