//! Tests for the output module

use super::*;
use crate::config::Codec;
use crate::reader::JsonBatch;
use crate::types::JsonObject;
use arrow::datatypes::{DataType, TimeUnit};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;
use std::fs::File;
use tempfile::tempdir;

fn batch_of(records: &[serde_json::Value]) -> JsonBatch {
    let rows: Vec<JsonObject> = records
        .iter()
        .map(|r| match r {
            serde_json::Value::Object(obj) => obj.clone(),
            other => panic!("test records must be objects, got {other}"),
        })
        .collect();
    JsonBatch::from_rows(rows)
}

fn read_back(path: &std::path::Path) -> Vec<arrow::record_batch::RecordBatch> {
    let file = File::open(path).unwrap();
    ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap()
        .collect::<std::result::Result<_, _>>()
        .unwrap()
}

// ============================================================================
// Type Inference Tests
// ============================================================================

#[test]
fn test_batch_to_arrow_scalar_types() {
    let batch = batch_of(&[json!({"i": 1, "f": 2.5, "s": "x", "b": true})]);
    let rb = batch_to_arrow(&batch).unwrap();

    let schema = rb.schema();
    assert_eq!(
        schema.field_with_name("i").unwrap().data_type(),
        &DataType::Int64
    );
    assert_eq!(
        schema.field_with_name("f").unwrap().data_type(),
        &DataType::Float64
    );
    assert_eq!(
        schema.field_with_name("s").unwrap().data_type(),
        &DataType::Utf8
    );
    assert_eq!(
        schema.field_with_name("b").unwrap().data_type(),
        &DataType::Boolean
    );
}

#[test]
fn test_batch_to_arrow_column_order_follows_batch() {
    let batch = batch_of(&[json!({"z": 1, "a": 2})]);
    let rb = batch_to_arrow(&batch).unwrap();

    let schema = rb.schema();
    let names: Vec<&str> = schema
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    assert_eq!(names, ["z", "a"]);
}

#[test]
fn test_batch_to_arrow_mixed_numbers_promote_to_float() {
    let batch = batch_of(&[json!({"v": 1}), json!({"v": 2.5})]);
    let rb = batch_to_arrow(&batch).unwrap();

    assert_eq!(
        rb.schema().field_with_name("v").unwrap().data_type(),
        &DataType::Float64
    );
}

#[test]
fn test_batch_to_arrow_conflicting_types_fall_back_to_string() {
    let batch = batch_of(&[json!({"v": 1}), json!({"v": "x"})]);
    let rb = batch_to_arrow(&batch).unwrap();

    assert_eq!(
        rb.schema().field_with_name("v").unwrap().data_type(),
        &DataType::Utf8
    );

    let values = arrow_to_json(&rb).unwrap();
    assert_eq!(values[0]["v"], json!("1"));
    assert_eq!(values[1]["v"], json!("x"));
}

#[test]
fn test_batch_to_arrow_all_null_column_is_string() {
    let batch = batch_of(&[json!({"v": null}), json!({"other": 1})]);
    let rb = batch_to_arrow(&batch).unwrap();

    assert_eq!(
        rb.schema().field_with_name("v").unwrap().data_type(),
        &DataType::Utf8
    );
}

#[test]
fn test_batch_to_arrow_datetime_strings_infer_as_timestamp() {
    let batch = batch_of(&[
        json!({"ts": "2024-01-15T10:30:00Z"}),
        json!({"ts": "2024-01-15T11:00:00Z"}),
    ]);
    let rb = batch_to_arrow(&batch).unwrap();

    assert_eq!(
        rb.schema().field_with_name("ts").unwrap().data_type(),
        &DataType::Timestamp(TimeUnit::Nanosecond, None)
    );
}

#[test]
fn test_batch_to_arrow_plain_strings_stay_strings() {
    let batch = batch_of(&[json!({"s": "2024 was a year"})]);
    let rb = batch_to_arrow(&batch).unwrap();

    assert_eq!(
        rb.schema().field_with_name("s").unwrap().data_type(),
        &DataType::Utf8
    );
}

#[test]
fn test_batch_to_arrow_empty_batch() {
    let batch = JsonBatch::from_rows(vec![]);
    let rb = batch_to_arrow(&batch).unwrap();
    assert_eq!(rb.num_rows(), 0);
    assert_eq!(rb.num_columns(), 0);
}

#[test]
fn test_batch_to_arrow_missing_keys_are_null() {
    let batch = batch_of(&[json!({"a": 1, "b": "x"}), json!({"a": 2})]);
    let rb = batch_to_arrow(&batch).unwrap();

    let values = arrow_to_json(&rb).unwrap();
    assert_eq!(values[1]["b"], json!(null));
}

#[test]
fn test_parse_datetime_nanos_formats() {
    assert!(parse_datetime_nanos("2024-01-15T10:30:00Z").is_some());
    assert!(parse_datetime_nanos("2024-01-15T10:30:00+02:00").is_some());
    assert!(parse_datetime_nanos("2024-01-15 10:30:00").is_some());
    assert!(parse_datetime_nanos("2024-01-15T10:30:00.123").is_some());
    assert!(parse_datetime_nanos("not a date").is_none());
}

// ============================================================================
// Round-Trip Tests
// ============================================================================

#[test]
fn test_arrow_to_json_roundtrip() {
    let batch = batch_of(&[
        json!({"id": 1, "name": "Alice", "score": 98.5, "active": true}),
        json!({"id": 2, "name": "Bob", "score": 75.0, "active": false}),
    ]);

    let rb = batch_to_arrow(&batch).unwrap();
    let values = arrow_to_json(&rb).unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["id"], json!(1));
    assert_eq!(values[0]["name"], json!("Alice"));
    assert_eq!(values[1]["active"], json!(false));
    assert!((values[1]["score"].as_f64().unwrap() - 75.0).abs() < f64::EPSILON);
}

#[test]
fn test_arrow_to_json_struct_column() {
    // Unflattened nested objects become struct columns
    let batch = batch_of(&[json!({"user": {"id": 1, "name": "Alice"}})]);

    let rb = batch_to_arrow(&batch).unwrap();
    let values = arrow_to_json(&rb).unwrap();

    assert_eq!(values[0]["user"]["id"], json!(1));
    assert_eq!(values[0]["user"]["name"], json!("Alice"));
}

#[test]
fn test_arrow_to_json_list_column() {
    let batch = batch_of(&[json!({"tags": ["a", "b"]}), json!({"tags": []})]);

    let rb = batch_to_arrow(&batch).unwrap();
    let values = arrow_to_json(&rb).unwrap();

    assert_eq!(values[0]["tags"], json!(["a", "b"]));
    assert_eq!(values[1]["tags"], json!([]));
}

// ============================================================================
// Parquet Sink Tests
// ============================================================================

#[test]
fn test_sink_creates_no_file_before_first_append() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.parquet");

    let sink = ParquetSink::create(&path, Codec::Snappy);
    assert!(sink.is_unopened());
    assert!(!path.exists());

    assert_eq!(sink.finish().unwrap(), 0);
    assert!(!path.exists());
}

#[test]
fn test_sink_single_batch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.parquet");

    let rb = batch_to_arrow(&batch_of(&[json!({"a": 1}), json!({"a": 2})])).unwrap();

    let mut sink = ParquetSink::create(&path, Codec::None);
    sink.append(&rb).unwrap();
    assert_eq!(sink.rows_written(), 2);
    assert_eq!(sink.finish().unwrap(), 2);

    let batches = read_back(&path);
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(total, 2);
}

#[test]
fn test_sink_appends_row_groups_incrementally() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.parquet");

    let rb1 = batch_to_arrow(&batch_of(&[json!({"a": 1}), json!({"a": 2})])).unwrap();
    let rb2 = batch_to_arrow(&batch_of(&[json!({"a": 3})])).unwrap();

    let mut sink = ParquetSink::create(&path, Codec::Snappy);
    sink.append(&rb1).unwrap();
    sink.append(&rb2).unwrap();
    assert_eq!(sink.finish().unwrap(), 3);

    let batches = read_back(&path);
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(total, 3);
}

#[test]
fn test_sink_rejects_conflicting_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.parquet");

    let rb1 = batch_to_arrow(&batch_of(&[json!({"a": 1})])).unwrap();
    let rb2 = batch_to_arrow(&batch_of(&[json!({"a": "text"})])).unwrap();

    let mut sink = ParquetSink::create(&path, Codec::Snappy);
    sink.append(&rb1).unwrap();

    let err = sink.append(&rb2).unwrap_err();
    assert!(matches!(err, crate::error::Error::Write { .. }));
}

#[test]
fn test_sink_unwritable_path() {
    let rb = batch_to_arrow(&batch_of(&[json!({"a": 1})])).unwrap();

    let mut sink = ParquetSink::create("/nonexistent/dir/out.parquet", Codec::Snappy);
    let err = sink.append(&rb).unwrap_err();
    assert!(matches!(err, crate::error::Error::Io(_)));
}

#[test]
fn test_codec_changes_output_size() {
    let dir = tempdir().unwrap();
    let uncompressed = dir.path().join("plain.parquet");
    let compressed = dir.path().join("gzip.parquet");

    let records: Vec<serde_json::Value> = (0..500)
        .map(|i| json!({"text": format!("{}-{i}", "abcdef".repeat(20))}))
        .collect();
    let rb = batch_to_arrow(&batch_of(&records)).unwrap();

    let mut sink = ParquetSink::create(&uncompressed, Codec::None);
    sink.append(&rb).unwrap();
    sink.finish().unwrap();

    let mut sink = ParquetSink::create(&compressed, Codec::Gzip);
    sink.append(&rb).unwrap();
    sink.finish().unwrap();

    let plain = std::fs::metadata(&uncompressed).unwrap().len();
    let gzipped = std::fs::metadata(&compressed).unwrap().len();
    assert!(gzipped < plain);
}
