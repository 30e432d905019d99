//! Credential providers

use super::types::Credentials;
use crate::error::{Error, Result};
use std::fmt;
use tracing::debug;

/// Environment variable pointing at a service-account key file
pub const APPLICATION_CREDENTIALS_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Environment variable holding an inline service-account key
pub const SERVICE_ACCOUNT_KEY_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";

/// Resolves the credentials a store should be opened with
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Resolve credentials, failing if they are unusable
    fn resolve(&self) -> Result<Credentials>;
}

/// Fixed credentials, typically taken from the configuration file
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentials {
    fn resolve(&self) -> Result<Credentials> {
        match &self.credentials {
            Credentials::ServiceAccountFile { path } if !path.is_file() => {
                Err(Error::invalid_value(
                    "credentials.path",
                    format!("service account file {} does not exist", path.display()),
                ))
            }
            Credentials::ServiceAccountKey { key } if key.trim().is_empty() => Err(
                Error::invalid_value("credentials.key", "service account key is empty"),
            ),
            other => Ok(other.clone()),
        }
    }
}

/// Credentials discovered from well-known environment variables
///
/// Lookup order: key file path, inline key, then ambient environment.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialProvider for EnvCredentials {
    fn resolve(&self) -> Result<Credentials> {
        let credentials = if let Ok(path) = std::env::var(APPLICATION_CREDENTIALS_VAR) {
            Credentials::ServiceAccountFile { path: path.into() }
        } else if let Ok(key) = std::env::var(SERVICE_ACCOUNT_KEY_VAR) {
            Credentials::ServiceAccountKey { key }
        } else {
            Credentials::Environment
        };

        debug!("Resolved {} credentials from environment", credentials.kind());
        StaticCredentials::new(credentials).resolve()
    }
}
