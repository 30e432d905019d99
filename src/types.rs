//! Common types used throughout taxi-etl
//!
//! Periods, services and the destination naming scheme derived from them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Warehouse dataset that receives every service table
pub const DEFAULT_DATASET: &str = "trips_data_all";

// ============================================================================
// Service
// ============================================================================

/// Taxi service (dataset color) published by the source
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Yellow medallion taxis
    Yellow,
    /// Green street-hail livery
    Green,
    /// For-hire vehicles
    Fhv,
}

impl Service {
    /// All services, in publication order
    pub const ALL: [Service; 3] = [Service::Yellow, Service::Green, Service::Fhv];

    /// Lower-case identifier used in URLs, paths and table names
    pub fn as_str(self) -> &'static str {
        match self {
            Service::Yellow => "yellow",
            Service::Green => "green",
            Service::Fhv => "fhv",
        }
    }

    /// Whether the source mirror carries monthly files for this year
    ///
    /// The FHV mirror only covers 2019.
    pub fn is_published_for(self, year: i32) -> bool {
        match self {
            Service::Fhv => year == 2019,
            Service::Yellow | Service::Green => true,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yellow" => Ok(Service::Yellow),
            "green" => Ok(Service::Green),
            "fhv" => Ok(Service::Fhv),
            other => Err(Error::invalid_value(
                "service",
                format!("unknown service '{other}' (expected yellow, green or fhv)"),
            )),
        }
    }
}

// ============================================================================
// Period Key
// ============================================================================

/// One (service, year, month) unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey {
    service: Service,
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Create a period, rejecting months outside 1..=12
    pub fn new(service: Service, year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid_value(
                "month",
                format!("{month} is not in 1..=12"),
            ));
        }
        Ok(Self {
            service,
            year,
            month,
        })
    }

    /// Build one period per month for a single service and year
    pub fn for_months(service: Service, year: i32, months: &[u32]) -> Result<Vec<Self>> {
        months
            .iter()
            .map(|&month| Self::new(service, year, month))
            .collect()
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Destination descriptor in the default warehouse dataset
    pub fn destination(&self) -> Destination {
        Destination::new(self, DEFAULT_DATASET)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{:02}", self.service, self.year, self.month)
    }
}

// ============================================================================
// Destination Descriptor
// ============================================================================

/// Deterministic naming derived from a period
///
/// ```text
/// folder:     {service}_taxi
/// file_stem:  {service}_tripdata_{year}-{month:02}
/// table:      {dataset}.{service}_taxi
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Destination {
    service: Service,
    folder: String,
    file_stem: String,
    table: String,
}

impl Destination {
    /// Derive the destination for a period, targeting the given warehouse dataset
    pub fn new(period: &PeriodKey, dataset: &str) -> Self {
        let service = period.service();
        let folder = format!("{service}_taxi");
        Self {
            service,
            file_stem: format!(
                "{service}_tripdata_{}-{:02}",
                period.year(),
                period.month()
            ),
            table: format!("{dataset}.{folder}"),
            folder,
        }
    }

    /// Folder shared by every month of a service (`green_taxi`)
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// File name without extension (`green_tripdata_2020-01`)
    pub fn file_stem(&self) -> &str {
        &self.file_stem
    }

    /// Qualified warehouse table (`trips_data_all.green_taxi`)
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Object key of the cleaned Parquet file
    pub fn object_key(&self) -> String {
        format!("{}/{}.parquet", self.folder, self.file_stem)
    }

    /// Local staging path under `root`
    pub fn local_path(&self, root: &Path) -> PathBuf {
        root.join(&self.folder)
            .join(format!("{}.parquet", self.file_stem))
    }

    /// Source URL of the raw gzip CSV under a releases base URL
    pub fn source_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}.csv.gz",
            base_url.trim_end_matches('/'),
            self.service,
            self.file_stem
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_service_serde() {
        let service: Service = serde_json::from_str("\"fhv\"").unwrap();
        assert_eq!(service, Service::Fhv);

        let json = serde_json::to_string(&Service::Green).unwrap();
        assert_eq!(json, "\"green\"");
    }

    #[test]
    fn test_service_from_str() {
        assert_eq!("Yellow".parse::<Service>().unwrap(), Service::Yellow);
        assert_eq!(" green ".parse::<Service>().unwrap(), Service::Green);
        assert!("purple".parse::<Service>().is_err());
    }

    #[test]
    fn test_fhv_only_published_for_2019() {
        assert!(Service::Fhv.is_published_for(2019));
        assert!(!Service::Fhv.is_published_for(2020));
        assert!(Service::Yellow.is_published_for(2020));
    }

    #[test]
    fn test_period_rejects_bad_month() {
        assert!(PeriodKey::new(Service::Green, 2020, 0).is_err());
        assert!(PeriodKey::new(Service::Green, 2020, 13).is_err());
        assert!(PeriodKey::new(Service::Green, 2020, 12).is_ok());
    }

    #[test]
    fn test_destination_naming() {
        let period = PeriodKey::new(Service::Green, 2020, 1).unwrap();
        let dest = period.destination();

        assert_eq!(dest.folder(), "green_taxi");
        assert_eq!(dest.file_stem(), "green_tripdata_2020-01");
        assert_eq!(dest.table_name(), "trips_data_all.green_taxi");
        assert_eq!(dest.object_key(), "green_taxi/green_tripdata_2020-01.parquet");
        assert_eq!(
            dest.local_path(Path::new("/tmp/datasets")),
            PathBuf::from("/tmp/datasets/green_taxi/green_tripdata_2020-01.parquet")
        );
        assert_eq!(
            dest.source_url("https://github.com/DataTalksClub/nyc-tlc-data/releases/download/"),
            "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/green/green_tripdata_2020-01.csv.gz"
        );
    }

    #[test]
    fn test_distinct_periods_have_distinct_destinations() {
        let mut keys = HashSet::new();
        let mut destinations = HashSet::new();
        for service in Service::ALL {
            for year in [2019, 2020, 2021] {
                for month in 1..=12 {
                    let period = PeriodKey::new(service, year, month).unwrap();
                    keys.insert(period);
                    destinations.insert(period.destination().object_key());
                }
            }
        }
        assert_eq!(keys.len(), destinations.len());
    }
}
