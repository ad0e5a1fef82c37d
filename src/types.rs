//! Common types used throughout the extractor
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A flattened record: column name to scalar value, ordered by column name
pub type FlatRow = BTreeMap<String, JsonValue>;

/// LinkedIn organization identifier
pub type OrganizationId = u64;

// ============================================================================
// URN
// ============================================================================

static URN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^urn:li:(\w+):(\d+)$").unwrap());

/// A LinkedIn entity URN such as `urn:li:organization:1234`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Urn {
    /// Entity type (`organization`, `share`, ...)
    pub entity_type: String,
    /// Numeric entity id
    pub id: u64,
}

impl Urn {
    /// Create a URN
    pub fn new(entity_type: impl Into<String>, id: u64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
        }
    }

    /// Create an organization URN
    pub fn organization(id: OrganizationId) -> Self {
        Self::new("organization", id)
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "urn:li:{}:{}", self.entity_type, self.id)
    }
}

impl FromStr for Urn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = URN_RE
            .captures(s)
            .ok_or_else(|| Error::malformed(format!("URN string invalid: {s}")))?;
        let id = caps[2]
            .parse()
            .map_err(|_| Error::malformed(format!("URN id out of range: {s}")))?;
        Ok(Self::new(&caps[1], id))
    }
}

// ============================================================================
// Load Type
// ============================================================================

/// How the destination table is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    /// Overwrite the destination table
    #[default]
    FullLoad,
    /// Upsert into the destination table by primary key
    IncrementalLoad,
}

impl LoadType {
    /// Whether the destination should be loaded incrementally
    pub fn is_incremental(self) -> bool {
        matches!(self, Self::IncrementalLoad)
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.trim().is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Extract a value from JSON using a simple dotted path
/// Supports basic paths like "$.paging.total" or "paging.total"
pub fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;
    for part in path.split('.') {
        match current {
            JsonValue::Object(map) => current = map.get(part)?,
            _ => return None,
        }
    }
    Some(current)
}
