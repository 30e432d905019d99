//! Tests for the fetchers

use super::*;
use crate::http::HttpClient;
use crate::output::{write_batch_to_parquet, ObjectStorage};
use crate::types::Service;
use crate::Error;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GREEN_CSV: &str = "\
VendorID,lpep_pickup_datetime,lpep_dropoff_datetime,store_and_fwd_flag,passenger_count
2,2020-01-01 00:45:58,2020-01-01 00:56:39,N,2
1,2020-01-01 00:41:38,2020-01-01 00:52:49,N,1
";

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn green_january() -> PeriodKey {
    PeriodKey::new(Service::Green, 2020, 1).unwrap()
}

// ============================================================================
// Web Fetcher Tests
// ============================================================================

#[test]
fn test_web_fetcher_url() {
    let fetcher = WebFetcher::new(
        HttpClient::new().unwrap(),
        "https://github.com/DataTalksClub/nyc-tlc-data/releases/download",
    );
    assert_eq!(
        fetcher.url(&green_january()),
        "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/green/green_tripdata_2020-01.csv.gz"
    );
}

#[tokio::test]
async fn test_web_fetcher_gzip_csv() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/green/green_tripdata_2020-01.csv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(GREEN_CSV)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = WebFetcher::new(HttpClient::new().unwrap(), mock_server.uri());
    let (table, count) = fetcher.fetch(&green_january()).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.column_names()[0], "VendorID");
}

#[tokio::test]
async fn test_web_fetcher_plain_csv() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GREEN_CSV))
        .mount(&mock_server)
        .await;

    let fetcher = WebFetcher::new(HttpClient::new().unwrap(), mock_server.uri());
    let (_, count) = fetcher.fetch(&green_january()).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_web_fetcher_long_row_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(gzip("VendorID,fare_amount\n1,9.5\n2,7.0,extra\n")),
        )
        .mount(&mock_server)
        .await;

    let fetcher = WebFetcher::new(HttpClient::new().unwrap(), mock_server.uri());
    let err = fetcher.fetch(&green_january()).await.unwrap_err();

    match err {
        Error::Fetch { url, .. } => assert!(url.ends_with("green_tripdata_2020-01.csv.gz")),
        other => panic!("expected Fetch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_web_fetcher_missing_file() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = WebFetcher::new(HttpClient::new().unwrap(), mock_server.uri());
    let result = fetcher.fetch(&green_january()).await;
    assert!(matches!(result, Err(Error::Fetch { .. })));
}

#[tokio::test]
async fn test_web_fetcher_unparseable_payload() {
    let mock_server = MockServer::start().await;

    let mut truncated = gzip(GREEN_CSV);
    truncated.truncate(24);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(truncated))
        .mount(&mock_server)
        .await;

    let fetcher = WebFetcher::new(HttpClient::new().unwrap(), mock_server.uri());
    let err = fetcher.fetch(&green_january()).await.unwrap_err();

    match err {
        Error::Fetch { url, .. } => assert!(url.ends_with("green_tripdata_2020-01.csv.gz")),
        other => panic!("expected fetch error, got {other:?}"),
    }
}

// ============================================================================
// Storage Fetcher Tests
// ============================================================================

#[tokio::test]
async fn test_storage_fetcher_round_trip() {
    let staging = tempfile::tempdir().unwrap();
    let storage = ObjectStorage::in_memory();

    let table = crate::decode::CsvDecoder::new()
        .decode(GREEN_CSV.as_bytes())
        .unwrap();
    let written = staging.path().join("upload.parquet");
    write_batch_to_parquet(&written, table.batch(), None).unwrap();

    let destination = green_january().destination();
    storage
        .upload(&written, &destination.object_key())
        .await
        .unwrap();

    let fetcher = StorageFetcher::new(storage, staging.path());
    let (fetched, count) = fetcher.fetch(&green_january()).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(fetched.column_names(), table.column_names());
    assert!(destination.local_path(staging.path()).is_file());
}

#[tokio::test]
async fn test_storage_fetcher_missing_object() {
    let staging = tempfile::tempdir().unwrap();
    let fetcher = StorageFetcher::new(ObjectStorage::in_memory(), staging.path());

    let err = fetcher.fetch(&green_january()).await.unwrap_err();
    match err {
        Error::NotFound { path } => {
            assert_eq!(path, "memory://green_taxi/green_tripdata_2020-01.parquet");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_storage_fetcher_corrupt_parquet() {
    let staging = tempfile::tempdir().unwrap();
    let storage = ObjectStorage::in_memory();

    let bogus = staging.path().join("bogus.parquet");
    std::fs::write(&bogus, b"not parquet at all").unwrap();
    storage
        .upload(&bogus, &green_january().destination().object_key())
        .await
        .unwrap();

    let fetcher = StorageFetcher::new(storage, staging.path());
    let result = fetcher.fetch(&green_january()).await;
    assert!(matches!(result, Err(Error::Parquet(_))));
}
