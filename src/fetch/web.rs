//! Fetch monthly CSV files over HTTP

use super::Fetcher;
use crate::config::SourceConfig;
use crate::decode::{CsvDecoder, RawTable};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::PeriodKey;
use async_trait::async_trait;
use tracing::info;

/// Downloads `{base_url}/{service}/{service}_tripdata_{year}-{month:02}.csv.gz`
#[derive(Debug, Clone)]
pub struct WebFetcher {
    client: HttpClient,
    base_url: String,
    decoder: CsvDecoder,
}

impl WebFetcher {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            decoder: CsvDecoder::new(),
        }
    }

    /// Build a fetcher with its own client from the source configuration
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let client = HttpClient::with_config(
            HttpClientConfig::builder().timeout(config.timeout()).build(),
        )?;
        Ok(Self::new(client, config.base_url.clone()))
    }

    /// Source URL for a period
    pub fn url(&self, period: &PeriodKey) -> String {
        period.destination().source_url(&self.base_url)
    }
}

#[async_trait]
impl Fetcher for WebFetcher {
    async fn fetch(&self, period: &PeriodKey) -> Result<(RawTable, usize)> {
        let url = self.url(period);
        info!("Fetching {period} from {url}");

        let body = self.client.get_bytes(&url).await?;
        let table = self
            .decoder
            .decode(&body)
            .map_err(|e| Error::fetch(&url, e.to_string()))?;

        let count = table.num_rows();
        info!("Detected {count} records in dataset");
        Ok((table, count))
    }
}
