//! Record reshaping ahead of flattening
//!
//! Share statistics carry their metrics in a nested `totalShareStatistics`
//! object that is lifted to the top level. Taxonomy entries are projected onto
//! a fixed set of columns per taxonomy.

use crate::endpoint::Taxonomy;
use crate::error::{Error, Result};
use crate::flatten::flatten_object;
use crate::types::{extract_path, FlatRow, JsonObject, JsonValue};

const SHARE_TOTALS_KEY: &str = "totalShareStatistics";

/// Optional fields kept for functions, industries and seniorities
const OPTIONAL_TAXONOMY_FIELDS: [&str; 3] = ["rollup", "rollupIds", "parentId"];

/// Lift `totalShareStatistics` into the element and flatten it
///
/// ```text
/// {"organizationalEntity": "urn:li:organization:1", "totalShareStatistics": {"clickCount": 4}}
///   → {"organizationalEntity": "urn:li:organization:1", "clickCount": 4}
/// ```
pub fn hoist_share_totals(record: &JsonValue) -> Result<FlatRow> {
    let mut element = as_object(record, "share statistics element")?.clone();
    if let Some(totals) = element.remove(SHARE_TOTALS_KEY) {
        match totals {
            JsonValue::Object(totals) => element.extend(totals),
            JsonValue::Null => {}
            other => {
                return Err(Error::malformed(format!(
                    "'{SHARE_TOTALS_KEY}' is not an object: {other}"
                )))
            }
        }
    }
    Ok(flatten_object(&element))
}

/// Project a taxonomy entry onto the columns of its table
pub fn project_taxonomy(taxonomy: Taxonomy, record: &JsonValue) -> Result<FlatRow> {
    let entry = as_object(record, "taxonomy entry")?;
    let field = |path: &str| extract_path(record, path).cloned().unwrap_or(JsonValue::Null);

    let mut projected = JsonObject::new();
    match taxonomy {
        Taxonomy::Countries => {
            projected.insert("name".into(), field("name.value"));
            projected.insert("id".into(), field("countryCode"));
            projected.insert("urn".into(), field("$URN"));
            projected.insert("countryCode".into(), field("countryCode"));
        }
        Taxonomy::Regions => {
            projected.insert("name".into(), field("name.value"));
            projected.insert("id".into(), field("id"));
            projected.insert("urn".into(), field("$URN"));
            projected.insert("country".into(), field("country"));
        }
        Taxonomy::Functions | Taxonomy::Industries | Taxonomy::Seniorities => {
            projected.insert("name".into(), field("name.localized.en_US"));
            projected.insert("id".into(), field("id"));
            projected.insert("urn".into(), field("$URN"));
            for name in OPTIONAL_TAXONOMY_FIELDS {
                if let Some(value) = entry.get(name).filter(|v| is_present(v)) {
                    projected.insert(name.into(), value.clone());
                }
            }
        }
    }
    Ok(flatten_object(&projected))
}

fn as_object<'a>(record: &'a JsonValue, what: &str) -> Result<&'a JsonObject> {
    record
        .as_object()
        .ok_or_else(|| Error::malformed(format!("{what} is not an object: {record}")))
}

/// Whether an optional field carries a meaningful value
fn is_present(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(o) => !o.is_empty(),
        JsonValue::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_hoist_share_totals() {
        let element = json!({
            "organizationalEntity": "urn:li:organization:42",
            "timeRange": {"start": 1_672_531_200_000_i64, "end": 1_672_617_600_000_i64},
            "totalShareStatistics": {"clickCount": 4, "impressionCount": 120, "engagement": 0.03}
        });
        let row = hoist_share_totals(&element).unwrap();

        assert_eq!(row["clickCount"], json!(4));
        assert_eq!(row["engagement"], json!(0.03));
        assert_eq!(row["timeRange_start"], json!("2023-01-01T00:00:00+00:00"));
        assert!(!row.keys().any(|k| k.starts_with("totalShareStatistics")));
    }

    #[test]
    fn test_countries_projection() {
        let entry = json!({
            "$URN": "urn:li:country:us",
            "countryCode": "us",
            "countryGroup": "urn:li:countryGroup:NA",
            "name": {"locale": {"country": "US", "language": "en"}, "value": "United States"}
        });
        let row = project_taxonomy(Taxonomy::Countries, &entry).unwrap();

        assert_eq!(
            row.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["countryCode", "id", "name", "urn"]
        );
        assert_eq!(row["id"], json!("us"));
        assert_eq!(row["name"], json!("United States"));
        assert_eq!(row["urn"], json!("urn:li:country:us"));
    }

    #[test]
    fn test_regions_projection() {
        let entry = json!({
            "$URN": "urn:li:region:7",
            "id": 7,
            "country": "urn:li:country:us",
            "name": {"value": "Greater Seattle Area"}
        });
        let row = project_taxonomy(Taxonomy::Regions, &entry).unwrap();
        assert_eq!(row["id"], json!(7));
        assert_eq!(row["country"], json!("urn:li:country:us"));
    }

    #[test]
    fn test_localized_projection_keeps_present_rollups() {
        let entry = json!({
            "$URN": "urn:li:industry:4",
            "id": 4,
            "name": {"localized": {"en_US": "Software Development"}},
            "rollupIds": [6, 1810],
            "parentId": null,
            "rollup": ""
        });
        let row = project_taxonomy(Taxonomy::Industries, &entry).unwrap();

        assert_eq!(row["name"], json!("Software Development"));
        assert_eq!(row["rollupIds"], json!("6,1810"));
        assert!(!row.contains_key("parentId"));
        assert!(!row.contains_key("rollup"));
    }

    #[test]
    fn test_non_object_entry_is_malformed() {
        let err = project_taxonomy(Taxonomy::Seniorities, &json!("x")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Upstream);
    }
}
