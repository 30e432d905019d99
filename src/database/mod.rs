//! Warehouse support via DuckDB
//!
//! The `Warehouse` trait is the append-only load target of the
//! storage-to-warehouse pipeline. `DuckDbWarehouse` keeps the tables in a
//! local DuckDB database file.

mod engine;
mod types;

pub use engine::{DuckDbWarehouse, Warehouse, IN_MEMORY};
pub use types::TableName;
