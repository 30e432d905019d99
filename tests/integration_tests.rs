//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: gzip CSV over HTTP → normalized Parquet in
//! object storage → rows appended to the warehouse

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::Arc;
use taxi_etl::database::{DuckDbWarehouse, TableName, Warehouse, IN_MEMORY};
use taxi_etl::engine::{Pipeline, PipelineKind};
use taxi_etl::output::ObjectStorage;
use taxi_etl::{Error, PeriodKey, PipelineConfig, Service};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GREEN_JANUARY: &str = "\
VendorID,lpep_pickup_datetime,lpep_dropoff_datetime,store_and_fwd_flag,RatecodeID,PULocationID,DOLocationID,passenger_count,trip_distance,fare_amount,payment_type,trip_type
2,2020-01-01 00:20:53,2020-01-01 00:37:02,N,1,42,41,1,1.43,10.5,2,1
1,2020-01-01 00:45:58,2020-01-01 00:56:39,N,1,193,7,,1.80,9.0,1,1
2,2020-01-01 00:41:38,2020-01-01 00:52:49,Y,1,74,238,2,2.84,11.0,1,1
";

const GREEN_FEBRUARY: &str = "\
VendorID,lpep_pickup_datetime,lpep_dropoff_datetime,store_and_fwd_flag,RatecodeID,PULocationID,DOLocationID,passenger_count,trip_distance,fare_amount,payment_type,trip_type
2,2020-02-01 00:10:00,2020-02-01 00:25:00,N,1,75,74,1,2.10,9.5,1,1
,2020-02-01 01:00:00,2020-02-01 01:09:00,,,,,,0.90,6.0,,
";

fn gzip(body: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

async fn mount_month(server: &MockServer, file: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/green/{file}.csv.gz")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(body)))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer, local_root: &TempDir) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.local_root = local_root.path().to_path_buf();
    config.source.base_url = server.uri();
    config.storage.url = "memory://".to_string();
    config.warehouse.path = IN_MEMORY.into();
    config.warehouse.chunk_size = 2;
    config
}

fn green(months: &[u32]) -> Vec<PeriodKey> {
    PeriodKey::for_months(Service::Green, 2020, months).unwrap()
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[tokio::test]
async fn test_web_to_storage_to_warehouse() {
    let server = MockServer::start().await;
    mount_month(&server, "green_tripdata_2020-01", GREEN_JANUARY).await;
    mount_month(&server, "green_tripdata_2020-02", GREEN_FEBRUARY).await;

    let local_root = TempDir::new().unwrap();
    let config = config_for(&server, &local_root);
    let storage = ObjectStorage::in_memory();
    let periods = green(&[1, 2]);

    // Web → storage
    let upload = Pipeline::web_to_storage(&config, storage.clone()).unwrap();
    let report = upload.run(&periods, true).await.unwrap();

    assert_eq!(report.kind, PipelineKind::WebToStorage);
    assert_eq!(report.total_rows, 5);
    assert!(local_root
        .path()
        .join("green_taxi/green_tripdata_2020-01.parquet")
        .exists());

    // Storage → warehouse
    let warehouse = Arc::new(DuckDbWarehouse::from_config(&config).unwrap());
    let load = Pipeline::storage_to_warehouse(&config, storage, warehouse.clone());
    let report = load.run(&periods, true).await.unwrap();

    assert_eq!(report.kind, PipelineKind::StorageToWarehouse);
    assert_eq!(report.total_rows, 5);
    assert_eq!(report.periods[0].fetched, 3);
    assert_eq!(report.periods[1].fetched, 2);

    let table = TableName::parse("trips_data_all.green_taxi").unwrap();
    assert_eq!(warehouse.row_count(&table).await.unwrap(), 5);

    // Appending is not idempotent
    load.run(&periods, true).await.unwrap();
    assert_eq!(warehouse.row_count(&table).await.unwrap(), 10);
}

#[tokio::test]
async fn test_missing_month_aborts_run() {
    let server = MockServer::start().await;
    mount_month(&server, "green_tripdata_2020-01", GREEN_JANUARY).await;

    let local_root = TempDir::new().unwrap();
    let config = config_for(&server, &local_root);
    let storage = ObjectStorage::in_memory();

    let pipeline = Pipeline::web_to_storage(&config, storage.clone()).unwrap();
    let err = pipeline.run(&green(&[1, 3]), true).await.unwrap_err();

    match err {
        Error::Fetch { url, message } => {
            assert!(url.ends_with("/green/green_tripdata_2020-03.csv.gz"));
            assert!(message.contains("404"));
        }
        other => panic!("expected Fetch, got {other:?}"),
    }

    // January completed before the failure and stays uploaded
    let copy = local_root.path().join("copy.parquet");
    storage
        .download("green_taxi/green_tripdata_2020-01.parquet", &copy)
        .await
        .unwrap();
    assert!(copy.exists());
}

#[tokio::test]
async fn test_storage_to_warehouse_without_upload() {
    let server = MockServer::start().await;
    let local_root = TempDir::new().unwrap();
    let config = config_for(&server, &local_root);

    let warehouse = Arc::new(DuckDbWarehouse::open(IN_MEMORY, &config.project_id).unwrap());
    let pipeline =
        Pipeline::storage_to_warehouse(&config, ObjectStorage::in_memory(), warehouse);

    let err = pipeline.run(&green(&[1]), false).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_file_bucket_and_warehouse() {
    let server = MockServer::start().await;
    mount_month(&server, "green_tripdata_2020-02", GREEN_FEBRUARY).await;

    let local_root = TempDir::new().unwrap();
    let bucket = TempDir::new().unwrap();
    let mut config = config_for(&server, &local_root);
    config.storage.url = bucket.path().display().to_string();
    config.warehouse.path = local_root.path().join("warehouse.duckdb");

    let storage = ObjectStorage::parse(
        &config.storage.url,
        &taxi_etl::auth::StaticCredentials::new(config.storage.credentials.clone()),
    )
    .unwrap();

    Pipeline::web_to_storage(&config, storage.clone())
        .unwrap()
        .run(&green(&[2]), false)
        .await
        .unwrap();
    assert!(bucket
        .path()
        .join("green_taxi/green_tripdata_2020-02.parquet")
        .exists());

    let table = TableName::parse("trips_data_all.green_taxi").unwrap();
    {
        let warehouse = Arc::new(DuckDbWarehouse::from_config(&config).unwrap());
        Pipeline::storage_to_warehouse(&config, storage, warehouse.clone())
            .run(&green(&[2]), false)
            .await
            .unwrap();
        assert_eq!(warehouse.row_count(&table).await.unwrap(), 2);
    }

    let reopened = DuckDbWarehouse::from_config(&config).unwrap();
    assert_eq!(reopened.row_count(&table).await.unwrap(), 2);
}
