//! Output module
//!
//! Turns finished tables into Parquet files with load manifests.
//!
//! # Overview
//!
//! ```text
//! <out>/tables/time_bound_page_statistics.parquet
//! <out>/tables/time_bound_page_statistics.manifest.json
//! ```
//!
//! - Arrow schemas are inferred from the flat rows of a table
//! - Each table is committed atomically (temp file + rename)
//! - Tables without rows are never written

mod manifest;
mod schema;
mod writer;

pub use manifest::TableManifest;
pub use schema::{batch_to_rows, infer_schema, table_to_batch};
pub use writer::{
    read_parquet_rows, write_batch_to_parquet, ParquetTableWriter, ParquetWriterConfig,
    TableWriter, WrittenTable, TABLES_DIR,
};
