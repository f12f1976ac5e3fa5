//! Streaming conversion pipeline
//!
//! Reads a JSONL file in bounded batches, flattens nested structures,
//! and appends each batch to a single Parquet file, accounting timing
//! and byte counts along the way.

use crate::config::ConversionConfig;
use crate::error::Error;
use crate::flatten::flatten_batch;
use crate::metrics::{ConversionMetrics, MetricsRecorder};
use crate::output::{batch_to_arrow, ParquetSink};
use crate::reader::JsonlReader;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// A failed conversion, carrying the metrics accumulated before the error
#[derive(Debug)]
pub struct ConversionError {
    /// What went wrong
    pub error: Error,
    /// Partial metrics recorded up to the failure
    pub metrics: ConversionMetrics,
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result of one streaming conversion call
pub type ConversionResult = std::result::Result<ConversionMetrics, ConversionError>;

/// Convert a JSONL file to a Parquet file in bounded batches
///
/// Runs read → flatten → write once per batch until the input is
/// exhausted, then returns the finished metrics. On the first failure the
/// error is logged and returned together with the metrics accumulated so
/// far; a partially written output file is not removed. An empty input
/// completes successfully with zero batches and no output file.
pub fn convert_jsonl_to_parquet(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> ConversionResult {
    let input = input.as_ref();
    let output = output.as_ref();

    if let Err(e) = config.validate() {
        return Err(fail(e, ConversionMetrics::default()));
    }

    let mut recorder = match MetricsRecorder::start(input) {
        Ok(recorder) => recorder,
        Err(e) => return Err(fail(e, ConversionMetrics::default())),
    };

    match run_stream(input, output, config, &mut recorder) {
        Ok(()) => {
            let metrics = recorder.finish(output);
            info!(
                total_secs = metrics.total_duration.as_secs_f64(),
                mean_batch_secs = metrics.mean_batch_duration().as_secs_f64(),
                compression_secs = metrics.compression_duration.as_secs_f64(),
                ratio = metrics.compression_ratio(),
                batches = metrics.batches(),
                "conversion completed"
            );
            Ok(metrics)
        }
        Err(e) => Err(fail(e, recorder.into_partial())),
    }
}

fn fail(error: Error, metrics: ConversionMetrics) -> ConversionError {
    error!(error = %error, "conversion failed");
    ConversionError { error, metrics }
}

/// The batch loop: read, flatten, convert, append
fn run_stream(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
    recorder: &mut MetricsRecorder,
) -> crate::error::Result<()> {
    let mut reader = JsonlReader::open(input, config.batch_size)?;
    let mut sink = ParquetSink::create(output, config.codec);
    let mut index = 0usize;

    loop {
        let batch_start = Instant::now();
        let Some(batch) = reader.next() else { break };
        let batch = flatten_batch(batch?);
        let record_batch = batch_to_arrow(&batch)?;

        let compression_start = Instant::now();
        sink.append(&record_batch)?;
        let compression_duration = compression_start.elapsed();

        let batch_duration = batch_start.elapsed();
        recorder.record_batch(batch_duration, compression_duration);
        index += 1;
        info!(
            batch = index,
            rows = record_batch.num_rows(),
            batch_secs = batch_duration.as_secs_f64(),
            compression_secs = compression_duration.as_secs_f64(),
            "batch written"
        );
    }

    sink.finish()?;
    Ok(())
}
