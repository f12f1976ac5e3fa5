//! Tabular batch of JSON records

use crate::types::{JsonObject, JsonValue};

/// An ordered group of JSON records with a shared column set
///
/// The column set is the union of keys observed across the batch's
/// records, in first-appearance order. A key missing from a record reads
/// as null.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBatch {
    columns: Vec<String>,
    rows: Vec<JsonObject>,
}

impl JsonBatch {
    /// Build a batch from records, deriving the column set
    pub fn from_rows(rows: Vec<JsonObject>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Build a batch from an explicit column list and rows
    ///
    /// Used by the flattener, which controls column order itself.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<JsonObject>) -> Self {
        Self { columns, rows }
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in order
    pub fn rows(&self) -> &[JsonObject] {
        &self.rows
    }

    /// Number of records
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True if the batch holds no records
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at a row/column position, if the record carries the key
    pub fn value(&self, row: usize, column: &str) -> Option<&JsonValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Value of a column in the first row
    pub fn first_value(&self, column: &str) -> Option<&JsonValue> {
        self.value(0, column)
    }

    /// Decompose into the column list and rows
    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<JsonObject>) {
        (self.columns, self.rows)
    }
}
