//! Object storage client (GCS, S3, R2, Azure, in-memory, local)

use crate::auth::{CredentialProvider, Credentials};
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// A bucket (plus optional key prefix) parsed from a URL
///
/// Cloning shares the underlying store, so an in-memory bucket can be handed
/// to both pipeline variants.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// Original URL scheme and bucket for logging
    root: String,
}

impl ObjectStorage {
    /// Parse a bucket URL and open the matching object store
    ///
    /// Supported formats:
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `az://container/path/` - Azure Blob Storage
    /// - `memory://` - process-local, for tests and dry runs
    /// - `/local/path/` or `file:///path/` - Local filesystem
    ///
    /// Service-account credentials are only accepted for `gs://` buckets.
    pub fn parse(url: &str, credentials: &dyn CredentialProvider) -> Result<Self> {
        let credentials = credentials.resolve()?;
        debug!(url, credentials = credentials.kind(), "Opening object storage");

        if let Some(rest) = url.strip_prefix("gs://") {
            return Self::open_gcs(rest, &credentials);
        }

        if credentials.is_google_specific() {
            return Err(Error::config(format!(
                "{} credentials are only supported for gs:// buckets, got {url}",
                credentials.kind()
            )));
        }

        if let Some(rest) = url.strip_prefix("s3://") {
            Self::open_s3(rest, false)
        } else if let Some(rest) = url.strip_prefix("r2://") {
            Self::open_s3(rest, true)
        } else if let Some(rest) = url.strip_prefix("az://") {
            Self::open_azure(rest)
        } else if let Some(rest) = url.strip_prefix("memory://") {
            Ok(Self::in_memory().with_prefix(rest))
        } else {
            Self::open_local(url.strip_prefix("file://").unwrap_or(url))
        }
    }

    /// A fresh, empty in-memory bucket
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            prefix: String::new(),
            root: "memory://".to_string(),
        }
    }

    #[must_use]
    fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_matches('/').to_string();
        self
    }

    fn open_gcs(rest: &str, credentials: &Credentials) -> Result<Self> {
        let (bucket, prefix) = split_bucket(rest);

        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket);
        match credentials {
            Credentials::ServiceAccountFile { path } => {
                builder = builder.with_service_account_path(path.to_string_lossy());
            }
            Credentials::ServiceAccountKey { key } => {
                builder = builder.with_service_account_key(key);
            }
            Credentials::Environment => {}
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            root: format!("gs://{bucket}"),
        })
    }

    fn open_s3(rest: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = split_bucket(rest);

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // AWS_ENDPOINT is read by from_env(); R2 also honours its own variable
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            root: format!("{scheme}://{bucket}"),
        })
    }

    fn open_azure(rest: &str) -> Result<Self> {
        let (container, prefix) = split_bucket(rest);

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            root: format!("az://{container}"),
        })
    }

    fn open_local(path: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            root: format!("file://{}", path.trim_end_matches('/')),
        })
    }

    /// Bucket root for logging (`gs://bucket`)
    pub fn root(&self) -> &str {
        &self.root
    }

    fn object_path(&self, key: &str) -> ObjectPath {
        if self.prefix.is_empty() {
            ObjectPath::from(key)
        } else {
            ObjectPath::from(format!("{}/{key}", self.prefix))
        }
    }

    /// Full URI of an object key, for logs and errors
    pub fn uri(&self, key: &str) -> String {
        let path = self.object_path(key);
        if self.root.ends_with('/') {
            format!("{}{path}", self.root)
        } else {
            format!("{}/{path}", self.root)
        }
    }

    /// Upload a local file to `key`, overwriting any existing object
    ///
    /// The local file is left in place whatever the outcome.
    pub async fn upload(&self, local: &Path, key: &str) -> Result<String> {
        let data = tokio::fs::read(local)
            .await
            .map_err(|e| Error::local_io(local, e))?;
        let size = data.len();

        let uri = self.uri(key);
        self.store
            .put(&self.object_path(key), Bytes::from(data).into())
            .await
            .map_err(|e| Error::upload(&uri, e.to_string()))?;

        info!("Uploaded {} ({size} bytes) to {uri}", local.display());
        Ok(uri)
    }

    /// Download `key` to a local path, creating parent directories
    pub async fn download(&self, key: &str, local: &Path) -> Result<PathBuf> {
        let uri = self.uri(key);
        let result = match self.store.get(&self.object_path(key)).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Err(Error::not_found(uri)),
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::local_io(parent, e))?;
        }
        let mut file = tokio::fs::File::create(local)
            .await
            .map_err(|e| Error::local_io(local, e))?;

        let mut stream = result.into_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?)
                .await
                .map_err(|e| Error::local_io(local, e))?;
        }
        file.flush().await.map_err(|e| Error::local_io(local, e))?;

        info!("Downloaded {uri} to {}", local.display());
        Ok(local.to_path_buf())
    }
}

/// Split `bucket/some/prefix/` into (`bucket`, `some/prefix`)
fn split_bucket(rest: &str) -> (&str, String) {
    match rest.split_once('/') {
        Some((bucket, prefix)) => (bucket, prefix.trim_matches('/').to_string()),
        None => (rest, String::new()),
    }
}
