//! Table writers
//!
//! [`ParquetTableWriter`] commits each table as a Parquet file plus manifest
//! under `<out>/tables/`. Both files go through a temp file and a rename so
//! a reader never sees a partial table.

use super::manifest::TableManifest;
use super::schema::{batch_to_rows, table_to_batch};
use crate::error::{Error, Result, ResultExt};
use crate::table::TableSpec;
use crate::types::FlatRow;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory under the output root holding table files
pub const TABLES_DIR: &str = "tables";

// ============================================================================
// Writer trait
// ============================================================================

/// A table that was committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTable {
    /// Table name
    pub name: String,
    /// Number of rows written
    pub rows: usize,
    /// Location of the data file
    pub path: PathBuf,
}

/// Persists finished tables
pub trait TableWriter: Send + Sync {
    /// Commit one table; `Ok(None)` when the table has no rows and was skipped
    fn write_table(&self, table: &TableSpec) -> Result<Option<WrittenTable>>;
}

// ============================================================================
// Parquet
// ============================================================================

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Writes tables as Parquet files with JSON manifests
#[derive(Debug, Clone)]
pub struct ParquetTableWriter {
    root: PathBuf,
    config: ParquetWriterConfig,
}

impl ParquetTableWriter {
    /// Create a writer rooted at the output directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config: ParquetWriterConfig::default(),
        }
    }

    /// Use a custom Parquet configuration
    #[must_use]
    pub fn with_config(mut self, config: ParquetWriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory receiving the table files
    pub fn tables_dir(&self) -> PathBuf {
        self.root.join(TABLES_DIR)
    }

    /// Path of a table's data file
    pub fn data_path(&self, table: &str) -> PathBuf {
        self.tables_dir().join(format!("{table}.parquet"))
    }

    /// Path of a table's manifest
    pub fn manifest_path(&self, table: &str) -> PathBuf {
        self.tables_dir().join(format!("{table}.manifest.json"))
    }
}

impl TableWriter for ParquetTableWriter {
    fn write_table(&self, table: &TableSpec) -> Result<Option<WrittenTable>> {
        if table.is_empty() {
            warn!("Table '{}' has no rows, skipping", table.name());
            return Ok(None);
        }

        std::fs::create_dir_all(self.tables_dir()).map_err(|e| {
            Error::output(format!(
                "Failed to create {}: {e}",
                self.tables_dir().display()
            ))
        })?;

        let batch = table_to_batch(table)?;
        let data_path = self.data_path(table.name());
        commit(&data_path, |tmp| {
            write_batch_to_parquet(tmp, &batch, &self.config).map(|_| ())
        })?;

        let manifest = serde_json::to_vec_pretty(&TableManifest::from_table(table))?;
        commit(&self.manifest_path(table.name()), |tmp| {
            std::fs::write(tmp, &manifest)
                .map_err(|e| Error::output(format!("Failed to write manifest: {e}")))
        })?;

        info!(
            "Wrote {} rows to table '{}' ({})",
            table.len(),
            table.name(),
            data_path.display()
        );
        Ok(Some(WrittenTable {
            name: table.name().to_string(),
            rows: table.len(),
            path: data_path,
        }))
    }
}

/// Produce `path` through a sibling temp file
fn commit(path: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    if let Err(e) = write(&temp) {
        let _ = std::fs::remove_file(&temp);
        return Err(e);
    }
    std::fs::rename(&temp, path)
        .map_err(|e| Error::output(format!("Failed to rename {}: {e}", temp.display())))
}

/// Write a single RecordBatch to a Parquet file
pub fn write_batch_to_parquet(
    path: impl AsRef<Path>,
    batch: &RecordBatch,
    config: &ParquetWriterConfig,
) -> Result<usize> {
    let file = File::create(path.as_ref()).map_err(|e| Error::Output {
        message: format!("Failed to create file: {e}"),
    })?;

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(config.build_properties()))
        .map_err(|e| Error::Output {
            message: format!("Failed to create Parquet writer: {e}"),
        })?;
    writer.write(batch).map_err(|e| Error::Output {
        message: format!("Failed to write batch: {e}"),
    })?;
    writer.close().map_err(|e| Error::Output {
        message: format!("Failed to close Parquet writer: {e}"),
    })?;

    Ok(batch.num_rows())
}

/// Read a Parquet file back into flat rows
pub fn read_parquet_rows(path: impl AsRef<Path>) -> Result<Vec<FlatRow>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        rows.extend(batch_to_rows(&batch?)?);
    }
    Ok(rows)
}
