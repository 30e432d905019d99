//! DuckDB-backed warehouse
//!
//! The warehouse database is attached under the project identifier, so every
//! table is addressed as `"{project}"."{dataset}"."{table}"`. Rows arrive as
//! Arrow batches; each batch is staged to a temporary Parquet file and read
//! back with `read_parquet`, which lets DuckDB map the Arrow types itself.

use super::types::TableName;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::output::{write_batch_to_parquet, ParquetWriterConfig};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Database path that keeps the warehouse in memory
pub const IN_MEMORY: &str = ":memory:";

/// Append-only sink for cleaned rows
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Append rows to `table`, creating it from the batch schema if absent.
    /// Returns the number of rows appended.
    async fn append_rows(&self, table: &TableName, batch: &RecordBatch) -> Result<usize>;

    /// Number of rows currently in `table`
    async fn row_count(&self, table: &TableName) -> Result<usize>;
}

/// Warehouse stored in a local DuckDB database file
pub struct DuckDbWarehouse {
    /// DuckDB connection
    conn: Mutex<Connection>,
    /// Catalog alias the warehouse is attached under
    catalog: String,
    /// Writer settings for staged chunks
    staging: ParquetWriterConfig,
}

impl DuckDbWarehouse {
    /// Open (or create) the warehouse at `path`, attached as `project_id`
    pub fn open(path: impl AsRef<Path>, project_id: &str) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_in_memory().map_err(|e| {
            Error::load(project_id, format!("Failed to create DuckDB connection: {e}"))
        })?;

        let location = if path == Path::new(IN_MEMORY) {
            IN_MEMORY.to_string()
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| Error::local_io(parent, e))?;
            }
            path.display().to_string()
        };

        let attach_sql = format!(
            "ATTACH {} AS {};",
            quote_literal(&location),
            quote_ident(project_id)
        );
        conn.execute_batch(&attach_sql).map_err(|e| {
            Error::load(project_id, format!("Failed to attach warehouse {location}: {e}"))
        })?;

        info!("Attached warehouse {location} as {project_id}");

        Ok(Self {
            conn: Mutex::new(conn),
            catalog: project_id.to_string(),
            staging: ParquetWriterConfig::new().uncompressed(),
        })
    }

    /// Open the warehouse described by the pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::open(&config.warehouse.path, &config.project_id)
    }

    /// Catalog alias (the project identifier)
    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    fn qualified(&self, table: &TableName) -> String {
        format!(
            "{}.{}.{}",
            quote_ident(&self.catalog),
            quote_ident(table.dataset()),
            quote_ident(table.table())
        )
    }

    fn lock(&self, table: &TableName) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::load(table.to_string(), "warehouse connection poisoned"))
    }

    fn append_blocking(&self, table: &TableName, batch: &RecordBatch) -> Result<usize> {
        if batch.num_rows() == 0 {
            return Ok(0);
        }

        let staged = tempfile::Builder::new()
            .prefix("taxi-etl-chunk-")
            .suffix(".parquet")
            .tempfile()?;
        write_batch_to_parquet(staged.path(), batch, Some(&self.staging))?;

        let source = format!(
            "read_parquet({})",
            quote_literal(&staged.path().display().to_string())
        );
        let target = self.qualified(table);
        let sql = format!(
            "CREATE SCHEMA IF NOT EXISTS {catalog}.{dataset};
             CREATE TABLE IF NOT EXISTS {target} AS SELECT * FROM {source} LIMIT 0;
             INSERT INTO {target} BY NAME SELECT * FROM {source};",
            catalog = quote_ident(&self.catalog),
            dataset = quote_ident(table.dataset()),
        );

        debug!("Executing append: {sql}");
        self.lock(table)?
            .execute_batch(&sql)
            .map_err(|e| Error::load(table.to_string(), e.to_string()))?;

        Ok(batch.num_rows())
    }

    /// Column names and DuckDB types of `table`, in table order
    pub fn column_types(&self, table: &TableName) -> Result<Vec<(String, String)>> {
        let sql = "SELECT column_name, data_type FROM information_schema.columns \
                   WHERE table_catalog = ? AND table_schema = ? AND table_name = ? \
                   ORDER BY ordinal_position";
        let conn = self.lock(table)?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::load(table.to_string(), e.to_string()))?;
        let columns = stmt
            .query_map([self.catalog.as_str(), table.dataset(), table.table()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .and_then(|rows| rows.collect::<std::result::Result<Vec<_>, _>>())
            .map_err(|e| Error::load(table.to_string(), e.to_string()))?;

        if columns.is_empty() {
            return Err(Error::load(table.to_string(), "table does not exist"));
        }
        Ok(columns)
    }

    fn count_blocking(&self, table: &TableName) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.qualified(table));
        let count: i64 = self
            .lock(table)?
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| Error::load(table.to_string(), e.to_string()))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl Warehouse for DuckDbWarehouse {
    async fn append_rows(&self, table: &TableName, batch: &RecordBatch) -> Result<usize> {
        self.append_blocking(table, batch)
    }

    async fn row_count(&self, table: &TableName) -> Result<usize> {
        self.count_blocking(table)
    }
}

/// Quote an SQL identifier
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote an SQL string literal
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
