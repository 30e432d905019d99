//! Credential types
//!
//! These mirror the `credentials` block of the pipeline configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Credentials used to open an object store
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// Let the store builder read its usual environment variables
    #[default]
    Environment,

    /// Google service-account JSON key on disk
    ServiceAccountFile {
        /// Path to the key file
        path: PathBuf,
    },

    /// Google service-account JSON key held in memory
    ServiceAccountKey {
        /// Serialized key
        key: String,
    },
}

impl Credentials {
    /// Short label for logs (never includes secret material)
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::Environment => "environment",
            Credentials::ServiceAccountFile { .. } => "service_account_file",
            Credentials::ServiceAccountKey { .. } => "service_account_key",
        }
    }

    /// Whether these credentials only make sense for Google Cloud Storage
    pub fn is_google_specific(&self) -> bool {
        !matches!(self, Credentials::Environment)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Environment => f.write_str("Environment"),
            Credentials::ServiceAccountFile { path } => f
                .debug_struct("ServiceAccountFile")
                .field("path", path)
                .finish(),
            Credentials::ServiceAccountKey { .. } => f
                .debug_struct("ServiceAccountKey")
                .field("key", &"***")
                .finish(),
        }
    }
}
