//! Arrow type inference and JSON to Arrow conversion
//!
//! Converts a [`JsonBatch`] into an Arrow RecordBatch, inferring one
//! data type per column, and converts RecordBatches back to JSON values
//! for round-trip checks.

use crate::error::{Error, Result};
use crate::reader::JsonBatch;
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, StringArray, StructArray,
    TimestampNanosecondArray,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::sync::Arc;

/// Convert a batch of JSON records to an Arrow RecordBatch
///
/// Column order follows the batch's column list, so equal inputs produce
/// equal schemas regardless of how the stream was split into batches.
/// Types are inferred by merging over every row of a column; a column with
/// no non-null values becomes nullable Utf8.
pub fn batch_to_arrow(batch: &JsonBatch) -> Result<RecordBatch> {
    let fields: Vec<Field> = batch
        .columns()
        .iter()
        .map(|col| Field::new(col, infer_column_type(batch, col), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    if batch.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns());
    for field in schema.fields() {
        let values: Vec<Option<&Value>> = batch
            .rows()
            .iter()
            .map(|row| row.get(field.name()))
            .collect();
        columns.push(build_array(&values, field.data_type())?);
    }

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Infer the Arrow type of one column by merging over all rows
fn infer_column_type(batch: &JsonBatch, column: &str) -> DataType {
    let mut merged = DataType::Null;
    for row in batch.rows() {
        if let Some(value) = row.get(column) {
            merged = merge_types(&merged, &infer_type(value));
        }
    }
    normalize_type(merged)
}

/// Replace residual Null types with nullable Utf8
///
/// Parquet has no encoding for a typed all-null column; the same holds
/// for list items and struct fields that never saw a non-null value.
fn normalize_type(data_type: DataType) -> DataType {
    match data_type {
        DataType::Null => DataType::Utf8,
        DataType::List(field) => DataType::List(Arc::new(Field::new(
            "item",
            normalize_type(field.data_type().clone()),
            true,
        ))),
        DataType::Struct(fields) => DataType::Struct(
            fields
                .iter()
                .map(|f| Field::new(f.name(), normalize_type(f.data_type().clone()), true))
                .collect::<Fields>(),
        ),
        other => other,
    }
}

/// Infer an Arrow DataType from a single JSON value
fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        Value::String(s) => {
            if is_datetime(s) {
                DataType::Timestamp(TimeUnit::Nanosecond, None)
            } else {
                DataType::Utf8
            }
        }
        Value::Array(arr) => {
            let element_type = arr
                .iter()
                .find(|v| !v.is_null())
                .map_or(DataType::Null, infer_type);
            DataType::List(Arc::new(Field::new("item", element_type, true)))
        }
        Value::Object(obj) => {
            let fields: Vec<Field> = obj
                .iter()
                .map(|(k, v)| Field::new(k, infer_type(v), true))
                .collect();
            DataType::Struct(Fields::from(fields))
        }
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        // Same types
        (a, b) if a == b => a.clone(),

        // Null can merge with anything
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        // Numbers can merge (prefer Float64 for mixed)
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        // Lists merge item-wise, so an empty list stays compatible
        (DataType::List(f1), DataType::List(f2)) => DataType::List(Arc::new(Field::new(
            "item",
            merge_types(f1.data_type(), f2.data_type()),
            true,
        ))),

        // Different types -> fall back to String (most flexible)
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values
                .iter()
                .map(|v| v.and_then(|v| v.as_f64().or_else(|| v.as_i64().map(|i| i as f64))))
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Timestamp(TimeUnit::Nanosecond, None) => {
            let nanos: Vec<Option<i64>> = values
                .iter()
                .map(|v| {
                    v.and_then(Value::as_str)
                        .and_then(parse_datetime_nanos)
                })
                .collect();
            Ok(Arc::new(TimestampNanosecondArray::from(nanos)))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.and_then(|v| match v {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        _ => {
            // Fall back to string representation
            let arr: StringArray = values.iter().map(|v| v.map(ToString::to_string)).collect();
            Ok(Arc::new(arr))
        }
    }
}

/// Build a list array from JSON arrays
fn build_list_array(values: &[Option<&Value>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items: Vec<Option<&Value>> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];

    for value in values {
        if let Some(Value::Array(arr)) = value {
            for item in arr {
                all_items.push(Some(item));
            }
        }
        // Both array and non-array cases need an offset
        let offset = i32::try_from(all_items.len()).map_err(|_| Error::Write {
            message: "Array too large for i32 offset".to_string(),
        })?;
        offsets.push(offset);
    }

    let items_array = build_array(&all_items, field.data_type())?;
    let offset_buffer = OffsetBuffer::new(offsets.into());

    let list_array = ListArray::new(Arc::clone(field), offset_buffer, items_array, None);
    Ok(Arc::new(list_array))
}

/// Build a struct array from JSON objects
fn build_struct_array(values: &[Option<&Value>], fields: &Fields) -> Result<ArrayRef> {
    let mut child_arrays: Vec<ArrayRef> = Vec::new();

    for field in fields {
        let child_values: Vec<Option<&Value>> = values
            .iter()
            .map(|v| {
                v.and_then(|v| {
                    if let Value::Object(obj) = v {
                        obj.get(field.name())
                    } else {
                        None
                    }
                })
            })
            .collect();

        child_arrays.push(build_array(&child_values, field.data_type())?);
    }

    let struct_array = StructArray::new(fields.clone(), child_arrays, None);
    Ok(Arc::new(struct_array))
}

/// Epoch nanoseconds of an ISO 8601 datetime string
pub(crate) fn parse_datetime_nanos(s: &str) -> Option<i64> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_nanos_opt();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return naive.and_utc().timestamp_nanos_opt();
        }
    }
    None
}

/// True if the string looks like an ISO 8601 datetime
fn is_datetime(s: &str) -> bool {
    // 2024-01-15T10:30:00Z / 2024-01-15 10:30:00.123
    let patterns = [
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}",
        r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}",
    ];

    for pattern in &patterns {
        if regex::Regex::new(pattern)
            .map(|re| re.is_match(s))
            .unwrap_or(false)
        {
            return true;
        }
    }
    false
}

/// Convert an Arrow RecordBatch to JSON records
///
/// Returns one JSON object per row. Used by round-trip tests and callers
/// that want to inspect written data.
pub fn arrow_to_json(batch: &RecordBatch) -> Result<Vec<Value>> {
    let schema = batch.schema();
    let num_rows = batch.num_rows();
    let mut records = Vec::with_capacity(num_rows);

    for row_idx in 0..num_rows {
        let mut record = serde_json::Map::new();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let column = batch.column(col_idx);
            let value = array_value_to_json(column.as_ref(), row_idx)?;
            record.insert(field.name().clone(), value);
        }

        records.push(Value::Object(record));
    }

    Ok(records)
}

/// Convert a single array element to JSON
fn array_value_to_json(array: &dyn arrow::array::Array, row: usize) -> Result<Value> {
    use arrow::array::Array;

    if array.is_null(row) {
        return Ok(Value::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(Value::Null),

        DataType::Boolean => {
            let arr = downcast::<BooleanArray>(array, "BooleanArray")?;
            Ok(Value::Bool(arr.value(row)))
        }

        DataType::Int64 => {
            let arr = downcast::<Int64Array>(array, "Int64Array")?;
            Ok(Value::Number(arr.value(row).into()))
        }

        DataType::Float64 => {
            let arr = downcast::<Float64Array>(array, "Float64Array")?;
            Ok(serde_json::Number::from_f64(arr.value(row)).map_or(Value::Null, Value::Number))
        }

        DataType::Timestamp(TimeUnit::Nanosecond, None) => {
            let arr = downcast::<TimestampNanosecondArray>(array, "TimestampNanosecondArray")?;
            let dt = chrono::DateTime::from_timestamp_nanos(arr.value(row));
            Ok(Value::String(dt.to_rfc3339()))
        }

        DataType::Utf8 => {
            let arr = downcast::<StringArray>(array, "StringArray")?;
            Ok(Value::String(arr.value(row).to_string()))
        }

        DataType::List(_) => {
            let arr = downcast::<ListArray>(array, "ListArray")?;
            let values = arr.value(row);
            let mut items = Vec::with_capacity(values.len());
            for i in 0..values.len() {
                items.push(array_value_to_json(values.as_ref(), i)?);
            }
            Ok(Value::Array(items))
        }

        DataType::Struct(_) => {
            let arr = downcast::<StructArray>(array, "StructArray")?;
            let mut obj = serde_json::Map::new();
            for (i, field) in arr.fields().iter().enumerate() {
                let col = arr.column(i);
                obj.insert(field.name().clone(), array_value_to_json(col.as_ref(), row)?);
            }
            Ok(Value::Object(obj))
        }

        other => Err(Error::write(format!(
            "unsupported data type in read-back: {other:?}"
        ))),
    }
}

fn downcast<'a, T: 'static>(array: &'a dyn arrow::array::Array, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::write(format!("Failed to downcast to {name}")))
}
