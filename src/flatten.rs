//! Nested JSON record flattening
//!
//! Converts a nested API record into a [`FlatRow`]: nested keys are joined with
//! `_`, arrays of scalars become one comma separated value, and Unix epoch
//! time fields become ISO-8601 strings.
//!
//! When two paths produce the same column (`"a_b"` next to `"a": {"b": ..}`),
//! the shallower path keeps the column; at equal depth the key visited first
//! keeps it. The losing value is dropped with a warning.
//!
//! ```text
//! {"timeRange": {"start": 1672531200000}, "views": {"all": 5}}
//!   → {"timeRange_start": "2023-01-01T00:00:00+00:00", "views_all": 5}
//! ```

use crate::types::{FlatRow, JsonObject, JsonValue};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use tracing::warn;

/// Separator between parent and child keys
pub const KEY_SEPARATOR: &str = "_";

/// Separator between array items collapsed into one value
pub const ARRAY_SEPARATOR: &str = ",";

/// Epoch values at or above this are milliseconds, below are seconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Unit of a Unix epoch value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    /// Seconds since the epoch
    Seconds,
    /// Milliseconds since the epoch
    Millis,
}

impl EpochUnit {
    /// Guess the unit from the magnitude of the value
    pub fn detect(value: i64) -> Self {
        if value.abs() >= MILLIS_THRESHOLD {
            Self::Millis
        } else {
            Self::Seconds
        }
    }
}

/// Flatten one record. Non-object records land in a single `value` column.
pub fn flatten_record(record: &JsonValue) -> FlatRow {
    match record {
        JsonValue::Object(obj) => flatten_object(obj),
        other => {
            let mut row = FlatRow::new();
            row.insert("value".to_string(), scalar_value(other));
            row
        }
    }
}

/// Flatten a JSON object
pub fn flatten_object(obj: &JsonObject) -> FlatRow {
    let mut flattener = Flattener::default();
    flattener.flatten_into(None, None, 0, obj);
    flattener.row
}

/// Row under construction plus the nesting depth each column came from
#[derive(Default)]
struct Flattener {
    row: FlatRow,
    depths: HashMap<String, usize>,
}

impl Flattener {
    fn flatten_into(
        &mut self,
        prefix: Option<&str>,
        parent_key: Option<&str>,
        depth: usize,
        obj: &JsonObject,
    ) {
        for (key, value) in obj {
            let key = column_key(key);
            let column = match prefix {
                Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
                None => key.to_string(),
            };

            match value {
                JsonValue::Object(child) => {
                    self.flatten_into(Some(&column), Some(key), depth + 1, child);
                }
                JsonValue::Number(n) if is_time_field(parent_key, key) => {
                    let converted = n
                        .as_i64()
                        .and_then(epoch_to_iso8601)
                        .map_or_else(|| value.clone(), JsonValue::String);
                    self.put(column, depth, converted);
                }
                other => self.put(column, depth, scalar_value(other)),
            }
        }
    }

    fn put(&mut self, column: String, depth: usize, value: JsonValue) {
        if let Some(&kept) = self.depths.get(&column) {
            if kept <= depth {
                warn!("Column '{column}' produced twice, dropping the value nested at depth {depth}");
                return;
            }
            warn!("Column '{column}' produced twice, dropping the value nested at depth {kept}");
        }
        self.depths.insert(column.clone(), depth);
        self.row.insert(column, value);
    }
}

/// Strip the `$` marker LinkedIn puts in front of some keys (`$URN`)
fn column_key(key: &str) -> &str {
    key.strip_prefix('$').unwrap_or(key)
}

/// Whether a leaf key holds a Unix epoch timestamp
///
/// Recognized: `timeRange.start` / `timeRange.end`, `*.time`
/// (`created.time`, `lastModified.time`) and `*At` fields
/// (`publishedAt`, `createdAt`, `lastModifiedAt`).
pub fn is_time_field(parent_key: Option<&str>, key: &str) -> bool {
    match (parent_key, key) {
        (Some("timeRange"), "start" | "end") => true,
        (_, "time") => true,
        (_, key) => key.len() > 2 && key.ends_with("At"),
    }
}

/// Convert Unix epoch seconds or milliseconds to an ISO-8601 UTC string
///
/// Millisecond precision is kept only when the value has a sub-second part.
pub fn epoch_to_iso8601(value: i64) -> Option<String> {
    let (dt, format) = match EpochUnit::detect(value) {
        EpochUnit::Millis => {
            let format = if value % 1000 == 0 {
                SecondsFormat::Secs
            } else {
                SecondsFormat::Millis
            };
            (DateTime::<Utc>::from_timestamp_millis(value)?, format)
        }
        EpochUnit::Seconds => (DateTime::<Utc>::from_timestamp(value, 0)?, SecondsFormat::Secs),
    };
    Some(dt.to_rfc3339_opts(format, false))
}

/// Convert an ISO-8601 string back to a Unix epoch value in the given unit
pub fn iso8601_to_epoch(value: &str, unit: EpochUnit) -> Option<i64> {
    let dt = DateTime::parse_from_rfc3339(value).ok()?;
    Some(match unit {
        EpochUnit::Seconds => dt.timestamp(),
        EpochUnit::Millis => dt.timestamp_millis(),
    })
}

/// Reduce any JSON value to a scalar column value
fn scalar_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(items) => JsonValue::String(collapse_array(items)),
        JsonValue::Object(_) => JsonValue::String(value.to_string()),
        scalar => scalar.clone(),
    }
}

fn collapse_array(items: &[JsonValue]) -> String {
    if items.iter().any(|v| v.is_object() || v.is_array()) {
        return JsonValue::Array(items.to_vec()).to_string();
    }
    items
        .iter()
        .map(|item| match item {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(ARRAY_SEPARATOR)
}
