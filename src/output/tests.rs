//! Tests for output module

use super::*;
use crate::auth::{Credentials, StaticCredentials};
use crate::error::Error;
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::basic::Compression;
use parquet::file::reader::{FileReader, SerializedFileReader};
use pretty_assertions::assert_eq;
use std::fs::File;
use std::sync::Arc;
use tempfile::tempdir;

fn sample_batch() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("vendorid", DataType::Int64, true),
        Field::new("dispatching_base_num", DataType::Utf8, true),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int64Array::from(vec![Some(1), None, Some(2)])),
            Arc::new(StringArray::from(vec!["B00001", "B00002", "B00003"])),
        ],
    )
    .unwrap()
}

fn env_credentials() -> StaticCredentials {
    StaticCredentials::new(Credentials::Environment)
}

fn column_compression(path: &std::path::Path) -> Compression {
    let reader = SerializedFileReader::new(File::open(path).unwrap()).unwrap();
    reader.metadata().row_group(0).column(0).compression()
}

// ============================================================================
// Writer Tests
// ============================================================================

#[test]
fn test_writer_config_defaults_to_gzip() {
    let config = ParquetWriterConfig::default();
    assert!(matches!(config.compression(), Compression::GZIP(_)));
    assert_eq!(config.row_group_size(), 1024 * 1024);
}

#[test]
fn test_writer_config_builder() {
    let config = ParquetWriterConfig::new()
        .uncompressed()
        .with_row_group_size(10);
    assert_eq!(config.compression(), Compression::UNCOMPRESSED);
    assert_eq!(config.row_group_size(), 10);
}

#[test]
fn test_write_batch_default_gzip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("green_tripdata_2020-01.parquet");

    let rows = write_batch_to_parquet(&path, &sample_batch(), None).unwrap();

    assert_eq!(rows, 3);
    assert!(matches!(column_compression(&path), Compression::GZIP(_)));
}

#[test]
fn test_write_batch_uncompressed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.parquet");
    let config = ParquetWriterConfig::new().uncompressed();

    write_batch_to_parquet(&path, &sample_batch(), Some(&config)).unwrap();

    assert_eq!(column_compression(&path), Compression::UNCOMPRESSED);
}

#[test]
fn test_writer_counts_rows_across_batches() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("multi.parquet");
    let batch = sample_batch();

    let mut writer =
        ParquetWriter::new(&path, batch.schema().as_ref(), &ParquetWriterConfig::new()).unwrap();
    writer.write(&batch).unwrap();
    writer.write(&batch).unwrap();
    assert_eq!(writer.rows_written(), 6);
    assert_eq!(writer.close().unwrap(), 6);

    let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
    assert_eq!(reader.metadata().file_metadata().num_rows(), 6);
}

#[test]
fn test_write_batch_missing_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("out.parquet");

    let err = write_batch_to_parquet(&path, &sample_batch(), None).unwrap_err();
    assert!(err.is_local_io());
}

#[cfg(target_os = "linux")]
#[test]
fn test_write_batch_device_full() {
    let err = write_batch_to_parquet("/dev/full", &sample_batch(), None).unwrap_err();
    match err {
        Error::LocalIo { path, .. } => assert_eq!(path, "/dev/full"),
        other => panic!("expected LocalIo, got {other:?}"),
    }
}

// ============================================================================
// Object Storage Tests
// ============================================================================

#[test]
fn test_parse_memory_with_prefix() {
    let storage = ObjectStorage::parse("memory://staging/", &env_credentials()).unwrap();
    assert_eq!(storage.root(), "memory://");
    assert_eq!(
        storage.uri("green_taxi/green_tripdata_2020-01.parquet"),
        "memory://staging/green_taxi/green_tripdata_2020-01.parquet"
    );
}

#[test]
fn test_in_memory_uri() {
    let storage = ObjectStorage::in_memory();
    assert_eq!(
        storage.uri("fhv/fhv_tripdata_2019-01.parquet"),
        "memory://fhv/fhv_tripdata_2019-01.parquet"
    );
}

#[test]
fn test_parse_local_path() {
    let dir = tempdir().unwrap();
    let bucket = dir.path().join("bucket");
    let url = format!("file://{}", bucket.display());

    let storage = ObjectStorage::parse(&url, &env_credentials()).unwrap();

    assert!(bucket.is_dir());
    assert_eq!(storage.root(), url);
    assert_eq!(storage.uri("a/b.parquet"), format!("{url}/a/b.parquet"));
}

#[test]
fn test_service_account_rejected_outside_gcs() {
    let credentials = StaticCredentials::new(Credentials::ServiceAccountKey {
        key: "{}".to_string(),
    });

    for url in ["memory://", "s3://bucket/trips"] {
        let err = ObjectStorage::parse(url, &credentials).unwrap_err();
        assert!(matches!(err, Error::Config { .. }), "{url}: {err}");
    }
}

#[tokio::test]
async fn test_upload_then_download_memory() {
    let dir = tempdir().unwrap();
    let local = dir.path().join("upload.bin");
    std::fs::write(&local, b"parquet bytes").unwrap();

    let storage = ObjectStorage::in_memory();
    let uri = storage.upload(&local, "yellow_taxi/x.parquet").await.unwrap();
    assert_eq!(uri, "memory://yellow_taxi/x.parquet");
    assert!(local.exists());

    let target = dir.path().join("nested").join("download.bin");
    let written = storage.download("yellow_taxi/x.parquet", &target).await.unwrap();

    assert_eq!(written, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"parquet bytes");
}

#[tokio::test]
async fn test_upload_overwrites() {
    let dir = tempdir().unwrap();
    let local = dir.path().join("file.bin");
    let storage = ObjectStorage::in_memory();

    std::fs::write(&local, b"first").unwrap();
    storage.upload(&local, "k").await.unwrap();
    std::fs::write(&local, b"second").unwrap();
    storage.upload(&local, "k").await.unwrap();

    let target = dir.path().join("out.bin");
    storage.download("k", &target).await.unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"second");
}

#[tokio::test]
async fn test_clones_share_bucket() {
    let dir = tempdir().unwrap();
    let local = dir.path().join("file.bin");
    std::fs::write(&local, b"shared").unwrap();

    let storage = ObjectStorage::in_memory();
    let other = storage.clone();
    storage.upload(&local, "k").await.unwrap();

    let target = dir.path().join("out.bin");
    other.download("k", &target).await.unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"shared");
}

#[tokio::test]
async fn test_download_missing_object() {
    let dir = tempdir().unwrap();
    let storage = ObjectStorage::parse("memory://bucket", &env_credentials()).unwrap();

    let err = storage
        .download("green_taxi/none.parquet", &dir.path().join("none.parquet"))
        .await
        .unwrap_err();

    match err {
        Error::NotFound { path } => {
            assert_eq!(path, "memory://bucket/green_taxi/none.parquet");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_missing_local_file() {
    let dir = tempdir().unwrap();
    let storage = ObjectStorage::in_memory();

    let err = storage
        .upload(&dir.path().join("absent.parquet"), "k")
        .await
        .unwrap_err();
    assert!(err.is_local_io());
}

#[tokio::test]
async fn test_local_bucket_round_trip() {
    let dir = tempdir().unwrap();
    let bucket = dir.path().join("bucket");
    let storage =
        ObjectStorage::parse(bucket.to_str().unwrap(), &env_credentials()).unwrap();

    let local = dir.path().join("staged.parquet");
    std::fs::write(&local, b"data").unwrap();
    storage
        .upload(&local, "green_taxi/green_tripdata_2020-01.parquet")
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(bucket.join("green_taxi/green_tripdata_2020-01.parquet")).unwrap(),
        b"data"
    );
}
