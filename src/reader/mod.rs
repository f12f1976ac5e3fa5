//! Record batch reader
//!
//! Reads newline-delimited JSON from a file, yielding bounded batches of
//! records. Blank and whitespace-only lines are skipped; any other line
//! that is not a JSON object is a parse error carrying its line number.

mod types;

pub use types::JsonBatch;

use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Streaming JSONL reader producing [`JsonBatch`] values
///
/// Forward-only and not restartable: reopen the input to read it again.
pub struct JsonlReader<R> {
    reader: R,
    batch_size: Option<usize>,
    line: usize,
}

impl JsonlReader<BufReader<File>> {
    /// Open a JSONL file
    ///
    /// `batch_size` bounds the number of records per batch; `None` means
    /// one batch for the whole file.
    pub fn open(path: impl AsRef<Path>, batch_size: Option<usize>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file), batch_size))
    }
}

impl<R: BufRead> JsonlReader<R> {
    /// Wrap an already-open buffered reader
    pub fn new(reader: R, batch_size: Option<usize>) -> Self {
        Self {
            reader,
            batch_size,
            line: 0,
        }
    }

    /// Read the next record, skipping blank lines
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_record(&mut self) -> Result<Option<JsonObject>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(trimmed)
                .map_err(|e| Error::parse(self.line, e.to_string()))?;

            return match value {
                Value::Object(obj) => Ok(Some(obj)),
                _ => Err(Error::parse(self.line, "expected a JSON object")),
            };
        }
    }
}

impl<R: BufRead> Iterator for JsonlReader<R> {
    type Item = Result<JsonBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut rows: Vec<JsonObject> = Vec::new();

        loop {
            match self.read_record() {
                Ok(Some(record)) => {
                    rows.push(record);
                    if Some(rows.len()) == self.batch_size {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => return Some(Err(e)),
            }
        }

        if rows.is_empty() {
            None
        } else {
            Some(Ok(JsonBatch::from_rows(rows)))
        }
    }
}

#[cfg(test)]
mod tests;
