//! Table manifests
//!
//! Each written table gets a `<name>.manifest.json` next to its data file
//! telling the loader how to merge it.

use crate::table::TableSpec;
use serde::{Deserialize, Serialize};

/// Load instructions for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableManifest {
    /// Primary key columns
    pub primary_key: Vec<String>,
    /// Whether rows are upserted rather than replacing the table
    pub incremental: bool,
    /// Column names in file order
    pub columns: Vec<String>,
}

impl TableManifest {
    /// Describe a table
    pub fn from_table(table: &TableSpec) -> Self {
        Self {
            primary_key: table.primary_key().to_vec(),
            incremental: table.load_type().is_incremental(),
            columns: table.columns().to_vec(),
        }
    }
}
