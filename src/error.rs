//! Error types for taxi-etl
//!
//! This module defines the error hierarchy for the whole pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Per-value coercion problems inside the normalizer never surface here; they
//! become nulls. Everything else propagates unmodified to the period driver.

use thiserror::Error;

/// The main error type for taxi-etl
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Extract Errors
    // ============================================================================
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("CSV parsing error: {message}")]
    CsvParse { message: String },

    #[error("Object not found: {path}")]
    NotFound { path: String },

    // ============================================================================
    // Transform Errors
    // ============================================================================
    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    // ============================================================================
    // Load Errors
    // ============================================================================
    #[error("Upload to {path} failed: {message}")]
    Upload { path: String, message: String },

    #[error("Failed to load into {table}: {message}")]
    Load { table: String, message: String },

    #[error("Object store error: {0}")]
    Storage(#[from] object_store::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error at {path}: {message}")]
    LocalIo { path: String, message: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create an upload error
    pub fn upload(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upload {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warehouse load error
    pub fn load(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a local IO error tied to a path
    pub fn local_io(path: impl AsRef<std::path::Path>, message: impl std::fmt::Display) -> Self {
        Self::LocalIo {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Check if this error came from the local filesystem
    pub fn is_local_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::LocalIo { .. })
    }
}

/// Result type alias for taxi-etl
pub type Result<T> = std::result::Result<T, Error>;
