//! In-memory destination tables
//!
//! A [`TableSpec`] accumulates flat rows for one destination table and checks
//! that every row carries its primary key. A [`TableSet`] groups the tables a
//! run produces, in the order they first receive a row.

use crate::error::{Error, Result};
use crate::types::{FlatRow, JsonValue, LoadType};
use std::collections::{HashMap, HashSet};

/// One destination table with its rows
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    name: String,
    primary_key: Vec<String>,
    columns: Vec<String>,
    rows: Vec<FlatRow>,
    load_type: LoadType,
}

impl TableSpec {
    /// Create an empty table
    pub fn new(name: impl Into<String>, primary_key: Vec<String>, load_type: LoadType) -> Self {
        Self {
            name: name.into(),
            columns: primary_key.clone(),
            primary_key,
            rows: Vec::new(),
            load_type,
        }
    }

    /// Append a row
    ///
    /// Fails with a data shape error when a primary key value is absent or null.
    pub fn push(&mut self, row: FlatRow) -> Result<()> {
        for column in &self.primary_key {
            match row.get(column) {
                Some(JsonValue::Null) | None => {
                    return Err(Error::data_shape(
                        &self.name,
                        column,
                        "record lacks a primary key value",
                    ));
                }
                Some(_) => {}
            }
        }

        let known: HashSet<&str> = self.columns.iter().map(String::as_str).collect();
        let new_columns: Vec<String> = row
            .keys()
            .filter(|k| !known.contains(k.as_str()))
            .cloned()
            .collect();
        self.columns.extend(new_columns);
        self.rows.push(row);
        Ok(())
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary key columns
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// All columns: primary key first, then in order of first appearance
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in insertion order
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Load type of the destination
    pub fn load_type(&self) -> LoadType {
        self.load_type
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The tables produced by one run
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    load_type: LoadType,
    tables: Vec<TableSpec>,
    index: HashMap<String, usize>,
}

impl TableSet {
    /// Create an empty set whose tables use the given load type
    pub fn new(load_type: LoadType) -> Self {
        Self {
            load_type,
            ..Default::default()
        }
    }

    /// Append a row to a table, creating the table on first use
    pub fn push(&mut self, table: &str, primary_key: &[String], row: FlatRow) -> Result<()> {
        let idx = match self.index.get(table) {
            Some(idx) => *idx,
            None => {
                self.tables.push(TableSpec::new(
                    table,
                    primary_key.to_vec(),
                    self.load_type,
                ));
                let idx = self.tables.len() - 1;
                self.index.insert(table.to_string(), idx);
                idx
            }
        };
        self.tables[idx].push(row)
    }

    /// Look up a table by name
    pub fn get(&self, table: &str) -> Option<&TableSpec> {
        self.index.get(table).map(|idx| &self.tables[*idx])
    }

    /// Table names in creation order
    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(TableSpec::name).collect()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table received a row
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of rows across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(TableSpec::len).sum()
    }

    /// Consume the set, yielding tables in creation order
    pub fn into_tables(self) -> Vec<TableSpec> {
        self.tables
    }
}
