//! Fixed-schema conversion
//!
//! The alternate, non-chunked path: load the whole input, coerce each
//! column to a declared type, project away everything else, and write a
//! single Parquet file. No flattening is applied.

use crate::config::Codec;
use crate::error::{Error, Result};
use crate::output::{parse_datetime_nanos, ParquetSink};
use crate::reader::{JsonBatch, JsonlReader};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Declared Column Types
// ============================================================================

/// Primitive or temporal type a column can be declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Float64,
    /// UTF-8 string
    Utf8,
    /// Nanosecond-precision timestamp
    TimestampNanos,
    /// Boolean
    Boolean,
}

impl ColumnType {
    /// The Arrow data type this column is written as
    pub fn to_arrow(self) -> DataType {
        match self {
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Utf8 => DataType::Utf8,
            ColumnType::TimestampNanos => DataType::Timestamp(TimeUnit::Nanosecond, None),
            ColumnType::Boolean => DataType::Boolean,
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Utf8 => "string",
            ColumnType::TimestampNanos => "timestamp[ns]",
            ColumnType::Boolean => "bool",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Schema Mapping
// ============================================================================

/// Ordered mapping from column name to declared type
///
/// Output columns appear in mapping order. Data columns not named here
/// are dropped; a mapped column missing from the data is a schema error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMapping {
    columns: Vec<(String, ColumnType)>,
}

impl Default for SchemaMapping {
    /// The default mapping: `id`, `timestamp`, `value`, `category`
    fn default() -> Self {
        Self::new()
            .with_column("id", ColumnType::Int64)
            .with_column("timestamp", ColumnType::TimestampNanos)
            .with_column("value", ColumnType::Float64)
            .with_column("category", ColumnType::Utf8)
    }
}

impl SchemaMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Append a column declaration
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push((name.into(), ty));
        self
    }

    /// Declared columns in order
    pub fn columns(&self) -> &[(String, ColumnType)] {
        &self.columns
    }

    /// Number of declared columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if no columns are declared
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build the Arrow schema for this mapping
    pub fn to_arrow_schema(&self) -> Schema {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|(name, ty)| Field::new(name, ty.to_arrow(), true))
            .collect();
        Schema::new(fields)
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Convert a JSONL file to Parquet against a declared schema
///
/// Loads the entire input as one table, coerces each mapped column to its
/// declared type, and writes exactly one output file with the default
/// codec. No chunking, no flattening. Values that cannot be coerced and
/// mapped columns absent from the data (including an empty input) fail
/// with a schema error.
pub fn convert_with_schema(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    mapping: Option<&SchemaMapping>,
) -> Result<()> {
    let default_mapping = SchemaMapping::default();
    let mapping = mapping.unwrap_or(&default_mapping);

    let mut reader = JsonlReader::open(input.as_ref(), None)?;
    let batch = match reader.next() {
        Some(batch) => batch?,
        None => JsonBatch::from_rows(Vec::new()),
    };

    for (name, _) in mapping.columns() {
        if !batch.columns().contains(name) {
            return Err(Error::schema(name, "column not present in input"));
        }
    }

    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(mapping.len());
    for (name, ty) in mapping.columns() {
        arrays.push(coerce_column(&batch, name, *ty)?);
    }

    let schema = Arc::new(mapping.to_arrow_schema());
    let record_batch = RecordBatch::try_new(schema, arrays)?;

    let mut sink = ParquetSink::create(output.as_ref(), Codec::default());
    sink.append(&record_batch)?;
    let rows = sink.finish()?;

    info!(rows, columns = mapping.len(), "fixed-schema conversion completed");
    Ok(())
}

/// Coerce one column of the batch to its declared type
fn coerce_column(batch: &JsonBatch, name: &str, ty: ColumnType) -> Result<ArrayRef> {
    let values: Vec<Option<&Value>> = batch.rows().iter().map(|row| row.get(name)).collect();

    match ty {
        ColumnType::Int64 => {
            let mut out: Vec<Option<i64>> = Vec::with_capacity(values.len());
            for value in &values {
                out.push(coerce_i64(*value, name)?);
            }
            Ok(Arc::new(Int64Array::from(out)))
        }
        ColumnType::Float64 => {
            let mut out: Vec<Option<f64>> = Vec::with_capacity(values.len());
            for value in &values {
                out.push(coerce_f64(*value, name)?);
            }
            Ok(Arc::new(Float64Array::from(out)))
        }
        ColumnType::Utf8 => {
            let out: Vec<Option<String>> = values.iter().map(|v| coerce_utf8(*v)).collect();
            Ok(Arc::new(StringArray::from(out)))
        }
        ColumnType::TimestampNanos => {
            let mut out: Vec<Option<i64>> = Vec::with_capacity(values.len());
            for value in &values {
                out.push(coerce_timestamp(*value, name)?);
            }
            Ok(Arc::new(TimestampNanosecondArray::from(out)))
        }
        ColumnType::Boolean => {
            let mut out: Vec<Option<bool>> = Vec::with_capacity(values.len());
            for value in &values {
                out.push(coerce_bool(*value, name)?);
            }
            Ok(Arc::new(BooleanArray::from(out)))
        }
    }
}

fn coerce_i64(value: Option<&Value>, column: &str) -> Result<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            // Whole-valued floats coerce losslessly
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(Error::schema(column, format!("cannot coerce {n} to int64"))),
            }
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::schema(column, format!("cannot coerce \"{s}\" to int64"))),
        Some(other) => Err(Error::schema(
            column,
            format!("cannot coerce {other} to int64"),
        )),
    }
}

fn coerce_f64(value: Option<&Value>, column: &str) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| Error::schema(column, format!("cannot coerce {n} to float64"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| Error::schema(column, format!("cannot coerce \"{s}\" to float64"))),
        Some(other) => Err(Error::schema(
            column,
            format!("cannot coerce {other} to float64"),
        )),
    }
}

fn coerce_utf8(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn coerce_timestamp(value: Option<&Value>, column: &str) -> Result<Option<i64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_datetime_nanos(s).map(Some).ok_or_else(|| {
            Error::schema(column, format!("cannot coerce \"{s}\" to timestamp[ns]"))
        }),
        // Integers are epoch nanoseconds
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
            Error::schema(column, format!("cannot coerce {n} to timestamp[ns]"))
        }),
        Some(other) => Err(Error::schema(
            column,
            format!("cannot coerce {other} to timestamp[ns]"),
        )),
    }
}

fn coerce_bool(value: Option<&Value>, column: &str) -> Result<Option<bool>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(Error::schema(
            column,
            format!("cannot coerce {other} to bool"),
        )),
    }
}
