//! Tests for the reader module

use super::*;
use std::io::Cursor;

fn reader(input: &str, batch_size: Option<usize>) -> JsonlReader<Cursor<Vec<u8>>> {
    JsonlReader::new(Cursor::new(input.as_bytes().to_vec()), batch_size)
}

// ============================================================================
// Batching Tests
// ============================================================================

#[test]
fn test_single_batch() {
    let input = "{\"a\": 1}\n{\"a\": 2}\n";
    let batches: Vec<_> = reader(input, Some(10)).collect::<Result<_>>().unwrap();

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].num_rows(), 2);
    assert_eq!(batches[0].columns(), &["a".to_string()]);
}

#[test]
fn test_batch_splitting() {
    let input = "{\"a\": 1}\n{\"a\": 2}\n{\"a\": 3}\n{\"a\": 4}\n{\"a\": 5}\n";
    let batches: Vec<_> = reader(input, Some(2)).collect::<Result<_>>().unwrap();

    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].num_rows(), 2);
    assert_eq!(batches[1].num_rows(), 2);
    // Final batch may be smaller
    assert_eq!(batches[2].num_rows(), 1);
}

#[test]
fn test_unbounded_reads_whole_file() {
    let input = "{\"a\": 1}\n{\"a\": 2}\n{\"a\": 3}\n";
    let batches: Vec<_> = reader(input, None).collect::<Result<_>>().unwrap();

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].num_rows(), 3);
}

#[test]
fn test_empty_input_yields_no_batches() {
    let batches: Vec<_> = reader("", Some(10)).collect();
    assert!(batches.is_empty());
}

#[test]
fn test_blank_lines_skipped() {
    let input = "{\"a\": 1}\n\n   \n{\"a\": 2}\n\n";
    let batches: Vec<_> = reader(input, Some(10)).collect::<Result<_>>().unwrap();

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].num_rows(), 2);
}

// ============================================================================
// Column Set Tests
// ============================================================================

#[test]
fn test_column_union_preserves_first_appearance_order() {
    let input = "{\"b\": 1, \"a\": 2}\n{\"a\": 3, \"c\": 4}\n";
    let batches: Vec<_> = reader(input, Some(10)).collect::<Result<_>>().unwrap();

    assert_eq!(
        batches[0].columns(),
        &["b".to_string(), "a".to_string(), "c".to_string()]
    );
}

#[test]
fn test_missing_key_reads_as_none() {
    let input = "{\"a\": 1}\n{\"b\": 2}\n";
    let batches: Vec<_> = reader(input, Some(10)).collect::<Result<_>>().unwrap();
    let batch = &batches[0];

    assert_eq!(batch.value(0, "a"), Some(&serde_json::json!(1)));
    assert_eq!(batch.value(0, "b"), None);
    assert_eq!(batch.value(1, "a"), None);
}

#[test]
fn test_first_value() {
    let input = "{\"a\": {\"x\": 1}}\n{\"a\": 2}\n";
    let batches: Vec<_> = reader(input, Some(10)).collect::<Result<_>>().unwrap();

    assert!(batches[0].first_value("a").unwrap().is_object());
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_malformed_line_is_parse_error() {
    let input = "{\"a\": 1}\nnot json\n";
    let results: Vec<_> = reader(input, Some(1)).collect();

    assert!(results[0].is_ok());
    match results[1].as_ref().unwrap_err() {
        Error::Parse { line, .. } => assert_eq!(*line, 2),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_non_object_line_is_parse_error() {
    let input = "[1, 2, 3]\n";
    let results: Vec<_> = reader(input, Some(10)).collect();

    match results[0].as_ref().unwrap_err() {
        Error::Parse { line, message } => {
            assert_eq!(*line, 1);
            assert!(message.contains("JSON object"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    match JsonlReader::open("/nonexistent/input.jsonl", Some(10)) {
        Err(Error::Io(_)) => {}
        Err(other) => panic!("expected IO error, got {other:?}"),
        Ok(_) => panic!("expected IO error, got a reader"),
    }
}

#[test]
fn test_parse_error_line_number_counts_blank_lines() {
    let input = "{\"a\": 1}\n\n{oops}\n";
    let results: Vec<_> = reader(input, Some(10)).collect();

    match results[0].as_ref().unwrap_err() {
        Error::Parse { line, .. } => assert_eq!(*line, 3),
        other => panic!("expected parse error, got {other:?}"),
    }
}
