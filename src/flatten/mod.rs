//! Structure flattener
//!
//! Expands nested-object columns into multiple dotted-name scalar columns
//! (`parent.child`) and rewrites list-valued columns to opaque JSON text.
//!
//! Column treatment is decided by a [`ColumnClassifier`]. The default,
//! [`FirstRowClassifier`], inspects only the first row of each column;
//! [`FullScanClassifier`] scans the whole column and catches mixed
//! scalar/object columns the first-row sniff misses.

use crate::reader::JsonBatch;
use crate::types::JsonValue;
use serde_json::Value;

/// Structural shape of a column, as decided by a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnShape {
    /// Values are nested objects; expand into dotted columns
    Object,
    /// Values are lists; rewrite to JSON text
    List,
    /// Scalar or null values; leave unchanged
    Scalar,
}

/// Decides how the flattener treats a column
pub trait ColumnClassifier {
    /// Classify a column of the given batch
    fn classify(&self, column: &str, batch: &JsonBatch) -> ColumnShape;
}

/// Classifies a column by the value in its first row
///
/// Cheap, but a column mixing scalars and objects across rows is decided
/// entirely by row zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstRowClassifier;

impl ColumnClassifier for FirstRowClassifier {
    fn classify(&self, column: &str, batch: &JsonBatch) -> ColumnShape {
        match batch.first_value(column) {
            Some(Value::Object(_)) => ColumnShape::Object,
            Some(Value::Array(_)) => ColumnShape::List,
            _ => ColumnShape::Scalar,
        }
    }
}

/// Classifies a column by scanning every row
///
/// Any object value makes the column `Object`; otherwise any list value
/// makes it `List`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullScanClassifier;

impl ColumnClassifier for FullScanClassifier {
    fn classify(&self, column: &str, batch: &JsonBatch) -> ColumnShape {
        let mut shape = ColumnShape::Scalar;
        for row in batch.rows() {
            match row.get(column) {
                Some(Value::Object(_)) => return ColumnShape::Object,
                Some(Value::Array(_)) => shape = ColumnShape::List,
                _ => {}
            }
        }
        shape
    }
}

/// Flatten a batch using the default first-row classifier
pub fn flatten_batch(batch: JsonBatch) -> JsonBatch {
    flatten_batch_with(batch, &FirstRowClassifier)
}

/// Flatten a batch using an explicit classifier
///
/// Object columns are removed and their dotted expansions appended at the
/// end of the column list, nested keys in first-appearance order; a row
/// whose value is not an object contributes null to every dotted column.
/// List columns keep their name; each value becomes its JSON text, with
/// empty or absent values becoming null.
///
/// Only the columns present on entry are processed: a dotted column whose
/// values are themselves objects is left object-typed for a later pass.
pub fn flatten_batch_with(batch: JsonBatch, classifier: &dyn ColumnClassifier) -> JsonBatch {
    let shapes: Vec<(String, ColumnShape)> = batch
        .columns()
        .iter()
        .map(|col| (col.clone(), classifier.classify(col, &batch)))
        .collect();

    let (mut columns, mut rows) = batch.into_parts();

    for (col, shape) in shapes {
        match shape {
            ColumnShape::Scalar => {}
            ColumnShape::List => {
                for row in &mut rows {
                    let rendered = render_list_value(row.get(&col));
                    row.insert(col.clone(), rendered);
                }
            }
            ColumnShape::Object => {
                let nested = nested_keys(&rows, &col);

                for row in &mut rows {
                    let nested_obj = match row.remove(&col) {
                        Some(Value::Object(obj)) => Some(obj),
                        _ => None,
                    };
                    for key in &nested {
                        let value = nested_obj
                            .as_ref()
                            .and_then(|o| o.get(key))
                            .cloned()
                            .unwrap_or(Value::Null);
                        row.insert(format!("{col}.{key}"), value);
                    }
                }

                columns.retain(|c| c != &col);
                for key in &nested {
                    columns.push(format!("{col}.{key}"));
                }
            }
        }
    }

    JsonBatch::from_parts(columns, rows)
}

/// Nested keys of an object column, in first-appearance order across rows
fn nested_keys(rows: &[crate::types::JsonObject], column: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for row in rows {
        if let Some(Value::Object(obj)) = row.get(column) {
            for key in obj.keys() {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.clone());
                }
            }
        }
    }
    keys
}

/// Textual rendering of a list-column value
///
/// Lists render as compact JSON; plain strings pass through unquoted.
/// Empty lists, empty strings, nulls and absent values become null.
fn render_list_value(value: Option<&JsonValue>) -> JsonValue {
    match value {
        None | Some(Value::Null) => Value::Null,
        Some(Value::Array(items)) if items.is_empty() => Value::Null,
        Some(Value::String(s)) if s.is_empty() => Value::Null,
        Some(Value::String(s)) => Value::String(s.clone()),
        Some(other) => serde_json::to_string(other)
            .ok()
            .map_or(Value::Null, Value::String),
    }
}
