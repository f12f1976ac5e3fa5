//! Incremental Parquet writer
//!
//! Writes a sequence of RecordBatches to a single Parquet file. The first
//! append creates the file and fixes the file-level schema and codec;
//! later appends add row groups to the same file. "Is this the first
//! write" is an explicit state transition here, not an encoder flag.

use crate::config::Codec;
use crate::error::{Error, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Incremental Parquet sink
///
/// Creating a sink performs no I/O; the output file appears on the first
/// [`append`](Self::append). A sink finished with zero appends leaves no
/// file behind. The sink assumes exclusive ownership of the output path
/// for its lifetime.
pub struct ParquetSink {
    path: PathBuf,
    codec: Codec,
    writer: Option<ArrowWriter<File>>,
    rows_written: usize,
}

impl ParquetSink {
    /// Create a sink for the given output path and codec
    pub fn create(path: impl AsRef<Path>, codec: Codec) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            codec,
            writer: None,
            rows_written: 0,
        }
    }

    /// Append a batch as one or more row groups
    ///
    /// The first call creates/truncates the file with this batch's schema.
    /// A later batch whose schema conflicts with the first fails with a
    /// write error; nothing is coerced.
    pub fn append(&mut self, batch: &RecordBatch) -> Result<()> {
        if self.writer.is_none() {
            self.writer = Some(self.open_writer(batch.schema())?);
        }
        if let Some(writer) = self.writer.as_mut() {
            writer
                .write(batch)
                .map_err(|e| Error::write(format!("failed to append batch: {e}")))?;
            self.rows_written += batch.num_rows();
        }
        Ok(())
    }

    /// Number of rows appended so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// True if no batch has been appended yet
    pub fn is_unopened(&self) -> bool {
        self.writer.is_none()
    }

    /// Finalize the file and return the total rows written
    ///
    /// Writes the footer. With zero appends this is a no-op returning 0.
    pub fn finish(self) -> Result<usize> {
        if let Some(writer) = self.writer {
            writer
                .close()
                .map_err(|e| Error::write(format!("failed to close parquet writer: {e}")))?;
        }
        Ok(self.rows_written)
    }

    fn open_writer(&self, schema: SchemaRef) -> Result<ArrowWriter<File>> {
        let file = File::create(&self.path)?;
        let props = WriterProperties::builder()
            .set_compression(self.codec.to_compression())
            .build();
        ArrowWriter::try_new(file, schema, Some(props))
            .map_err(|e| Error::write(format!("failed to create parquet writer: {e}")))
    }
}
