//! Credential resolution for cloud object storage
//!
//! Supports: ambient environment, service-account key file, inline service-account key
//!
//! Components never look credentials up themselves. A `CredentialProvider` is
//! injected at construction and resolved once when a store is opened.

mod provider;
mod types;

pub use provider::{CredentialProvider, EnvCredentials, StaticCredentials};
pub use types::Credentials;
