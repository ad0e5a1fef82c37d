//! Arrow schema inference and table to Arrow conversion
//!
//! Flat rows only hold scalars, so every column maps onto one of
//! `Boolean`, `Int64`, `Float64` or `Utf8`.

use crate::error::{Error, Result};
use crate::table::TableSpec;
use crate::types::{FlatRow, JsonValue};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Infer the Arrow schema of a table
///
/// Fields follow the table's column order and are all nullable. A column
/// holding only nulls is typed `Utf8`.
pub fn infer_schema(table: &TableSpec) -> Schema {
    let fields: Vec<Field> = table
        .columns()
        .iter()
        .map(|column| {
            let dtype = table
                .rows()
                .iter()
                .filter_map(|row| row.get(column))
                .map(infer_type)
                .fold(DataType::Null, |acc, t| merge_types(&acc, &t));
            let dtype = if dtype == DataType::Null {
                DataType::Utf8
            } else {
                dtype
            };
            Field::new(column, dtype, true)
        })
        .collect();

    Schema::new(fields)
}

/// Convert a table to an Arrow RecordBatch
pub fn table_to_batch(table: &TableSpec) -> Result<RecordBatch> {
    let schema = Arc::new(infer_schema(table));

    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let values: Vec<Option<&JsonValue>> = table
                .rows()
                .iter()
                .map(|row| row.get(field.name()).filter(|v| !v.is_null()))
                .collect();
            build_array(&values, field.data_type())
        })
        .collect::<Result<Vec<_>>>()?;

    RecordBatch::try_new(schema, columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch for '{}': {e}", table.name()),
    })
}

/// Convert a RecordBatch back into flat rows, omitting null cells
pub fn batch_to_rows(batch: &RecordBatch) -> Result<Vec<FlatRow>> {
    let schema = batch.schema();
    let mut rows = vec![FlatRow::new(); batch.num_rows()];

    for (col_idx, field) in schema.fields().iter().enumerate() {
        let column = batch.column(col_idx);
        for (row_idx, row) in rows.iter_mut().enumerate() {
            let value = array_value_to_json(column.as_ref(), row_idx)?;
            if !value.is_null() {
                row.insert(field.name().clone(), value);
            }
        }
    }

    Ok(rows)
}

/// Infer Arrow DataType from a scalar JSON value
fn infer_type(value: &JsonValue) -> DataType {
    match value {
        JsonValue::Null => DataType::Null,
        JsonValue::Bool(_) => DataType::Boolean,
        JsonValue::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        JsonValue::String(_) | JsonValue::Array(_) | JsonValue::Object(_) => DataType::Utf8,
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        // Different types -> fall back to String
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&JsonValue>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values
                .iter()
                .map(|v| v.and_then(JsonValue::as_bool))
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values
                .iter()
                .map(|v| v.and_then(JsonValue::as_i64))
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values
                .iter()
                .map(|v| v.and_then(JsonValue::as_f64))
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        JsonValue::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }

        other => Err(Error::output(format!(
            "unsupported column type {other:?}"
        ))),
    }
}

/// Convert a single array element to JSON
fn array_value_to_json(array: &dyn Array, row: usize) -> Result<JsonValue> {
    if array.is_null(row) {
        return Ok(JsonValue::Null);
    }

    let downcast_error =
        |name: &str| Error::output(format!("Failed to downcast to {name}"));

    match array.data_type() {
        DataType::Boolean => {
            let arr = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(|| downcast_error("BooleanArray"))?;
            Ok(JsonValue::Bool(arr.value(row)))
        }

        DataType::Int64 => {
            let arr = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| downcast_error("Int64Array"))?;
            Ok(JsonValue::Number(arr.value(row).into()))
        }

        DataType::Float64 => {
            let arr = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| downcast_error("Float64Array"))?;
            Ok(serde_json::Number::from_f64(arr.value(row)).map_or(JsonValue::Null, JsonValue::Number))
        }

        DataType::Utf8 => {
            let arr = array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| downcast_error("StringArray"))?;
            Ok(JsonValue::String(arr.value(row).to_string()))
        }

        other => Err(Error::output(format!(
            "unsupported column type {other:?}"
        ))),
    }
}
