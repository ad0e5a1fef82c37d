//! Lifetime statistics fan-out
//!
//! A lifetime statistics element carries aggregate metrics next to arrays of
//! per-bucket metrics, one array per enumerated dimension:
//!
//! ```text
//! {
//!   "organization": "urn:li:organization:42",
//!   "totalPageStatistics": {...},
//!   "pageStatisticsBySeniority": [{"seniority": "urn:li:seniority:3", "pageStatistics": {...}}],
//!   "pageStatisticsByGeoCountry": [{"geo": "urn:li:geo:101", "pageStatistics": {...}}]
//! }
//! ```
//!
//! Page statistics become one `total_page_statistics` row plus rows in
//! `page_statistics_by_seniority` and `page_statistics_by_geo_country`.
//! Follower statistics (`followerCountsBy*`) only produce the dimension tables.

use crate::endpoint::FanoutRule;
use crate::error::{Error, Result};
use crate::flatten::{flatten_object, flatten_record};
use crate::table::TableSet;
use crate::types::{JsonObject, JsonValue};

/// Table receiving page statistics totals
pub const TOTAL_PAGE_STATISTICS: &str = "total_page_statistics";

impl FanoutRule {
    /// Key prefix marking a dimension array
    pub fn dimension_prefix(self) -> &'static str {
        match self {
            Self::PageStatistics => "pageStatisticsBy",
            Self::FollowerStatistics => "followerCountsBy",
        }
    }

    /// Prefix of the per-dimension table names
    pub fn table_prefix(self) -> &'static str {
        match self {
            Self::PageStatistics => "page_statistics_by_",
            Self::FollowerStatistics => "follower_counts_by_",
        }
    }

    /// Column identifying the organization
    pub fn entity_column(self) -> &'static str {
        match self {
            Self::PageStatistics => "organization",
            Self::FollowerStatistics => "organizationalEntity",
        }
    }

    /// Totals table, if the rule produces one
    pub fn totals_table(self) -> Option<&'static str> {
        match self {
            Self::PageStatistics => Some(TOTAL_PAGE_STATISTICS),
            Self::FollowerStatistics => None,
        }
    }
}

/// Split one lifetime statistics element into totals and dimension rows
pub fn fan_out(rule: FanoutRule, record: &JsonValue, tables: &mut TableSet) -> Result<()> {
    let JsonValue::Object(obj) = record else {
        return Err(Error::malformed(format!(
            "lifetime statistics element is not an object: {record}"
        )));
    };

    let prefix = rule.dimension_prefix();
    let entity_column = rule.entity_column();
    let mut totals = JsonObject::new();
    let mut dimensions = Vec::new();

    for (key, value) in obj {
        match key.strip_prefix(prefix) {
            Some(dimension) if !dimension.is_empty() => {
                if let JsonValue::Array(buckets) = value {
                    dimensions.push((dimension, buckets));
                }
            }
            _ => {
                totals.insert(key.clone(), value.clone());
            }
        }
    }

    if let Some(table) = rule.totals_table() {
        tables.push(table, &[entity_column.to_string()], flatten_object(&totals))?;
    }

    let entity = obj.get(entity_column).cloned().unwrap_or(JsonValue::Null);
    for (dimension, buckets) in dimensions {
        let Some(first) = buckets.first() else {
            continue;
        };
        let table = format!("{}{}", rule.table_prefix(), to_snake_case(dimension));
        let column = dimension_column(dimension, first).ok_or_else(|| {
            Error::data_shape(
                &table,
                lower_camel(dimension),
                "dimension bucket has no identifying tag",
            )
        })?;
        let primary_key = [entity_column.to_string(), column];

        for bucket in buckets {
            let mut row = flatten_record(bucket);
            row.insert(entity_column.to_string(), entity.clone());
            tables.push(&table, &primary_key, row)?;
        }
    }

    Ok(())
}

/// Column naming the bucket's dimension value
///
/// The lower camel form of the dimension (`seniority`, `staffCountRange`) when
/// the bucket has it, otherwise the bucket's single scalar tag (`geo`).
fn dimension_column(dimension: &str, bucket: &JsonValue) -> Option<String> {
    let JsonValue::Object(obj) = bucket else {
        return None;
    };
    let camel = lower_camel(dimension);
    if obj.contains_key(&camel) {
        return Some(camel);
    }

    let mut scalars = obj
        .iter()
        .filter(|(_, v)| !v.is_object() && !v.is_array())
        .map(|(k, _)| k);
    match (scalars.next(), scalars.next()) {
        (Some(tag), None) => Some(tag.clone()),
        _ => None,
    }
}

fn lower_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `StaffCountRange` → `staff_count_range`, `IndustryV2` → `industry_v2`
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
