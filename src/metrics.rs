//! Conversion metrics
//!
//! Per-batch timing and aggregate byte counts for one streaming
//! conversion call. A [`MetricsRecorder`] owns the bookkeeping while the
//! conversion runs; the finished [`ConversionMetrics`] is read-only.

use crate::error::Result;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// Metrics for one conversion call
///
/// `output_bytes` and the total duration are only meaningful once the
/// stream has been fully written.
#[derive(Debug, Clone, Default)]
pub struct ConversionMetrics {
    /// Total wall-clock duration of the conversion
    pub total_duration: Duration,
    /// Per-batch durations, in batch order
    pub batch_durations: Vec<Duration>,
    /// Cumulative time spent encoding and writing
    pub compression_duration: Duration,
    /// Input file size in bytes
    pub input_bytes: u64,
    /// Output file size in bytes (0 if no file was produced)
    pub output_bytes: u64,
}

impl ConversionMetrics {
    /// Number of batches processed
    pub fn batches(&self) -> usize {
        self.batch_durations.len()
    }

    /// Mean batch duration; zero for an empty batch sequence
    pub fn mean_batch_duration(&self) -> Duration {
        let count = self.batch_durations.len() as u32;
        if count == 0 {
            return Duration::ZERO;
        }
        self.batch_durations.iter().sum::<Duration>() / count
    }

    /// Output bytes over input bytes; zero for zero-byte input
    pub fn compression_ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.output_bytes as f64 / self.input_bytes as f64
    }
}

const MIB: f64 = 1024.0 * 1024.0;

impl std::fmt::Display for ConversionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Conversion Metrics Summary")?;
        writeln!(f, "{}", "-".repeat(50))?;
        writeln!(
            f,
            "Total duration: {:.2} seconds",
            self.total_duration.as_secs_f64()
        )?;
        writeln!(
            f,
            "Mean batch duration: {:.2} seconds",
            self.mean_batch_duration().as_secs_f64()
        )?;
        writeln!(
            f,
            "Total compression time: {:.2} seconds",
            self.compression_duration.as_secs_f64()
        )?;
        writeln!(
            f,
            "Input file size: {:.2} MiB",
            self.input_bytes as f64 / MIB
        )?;
        writeln!(
            f,
            "Output file size: {:.2} MiB",
            self.output_bytes as f64 / MIB
        )?;
        writeln!(
            f,
            "Compression ratio: {:.2}%",
            self.compression_ratio() * 100.0
        )?;
        write!(f, "Batches processed: {}", self.batches())
    }
}

/// Accumulates metrics while a conversion runs
///
/// Lifecycle: [`start`](Self::start) measures the input size and the
/// start instant; [`record_batch`](Self::record_batch) once per batch;
/// [`finish`](Self::finish) measures the output size and total elapsed
/// time. [`into_partial`](Self::into_partial) closes the recorder on the
/// failure path, keeping whatever was accumulated.
#[derive(Debug)]
pub struct MetricsRecorder {
    started: Instant,
    metrics: ConversionMetrics,
}

impl MetricsRecorder {
    /// Start recording, measuring the input file size
    pub fn start(input_path: impl AsRef<Path>) -> Result<Self> {
        let input_bytes = fs::metadata(input_path.as_ref())?.len();
        Ok(Self {
            started: Instant::now(),
            metrics: ConversionMetrics {
                input_bytes,
                ..ConversionMetrics::default()
            },
        })
    }

    /// Record one processed batch
    pub fn record_batch(&mut self, batch_duration: Duration, compression_duration: Duration) {
        self.metrics.batch_durations.push(batch_duration);
        self.metrics.compression_duration += compression_duration;
    }

    /// Finish recording, measuring the output file size
    ///
    /// A missing output file (zero batches written) counts as 0 bytes.
    pub fn finish(mut self, output_path: impl AsRef<Path>) -> ConversionMetrics {
        self.metrics.output_bytes = fs::metadata(output_path.as_ref())
            .map(|m| m.len())
            .unwrap_or(0);
        self.metrics.total_duration = self.started.elapsed();
        self.metrics
    }

    /// Close the recorder after a failure, keeping partial metrics
    pub fn into_partial(mut self) -> ConversionMetrics {
        self.metrics.total_duration = self.started.elapsed();
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mean_batch_duration_empty_is_zero() {
        let metrics = ConversionMetrics::default();
        assert_eq!(metrics.mean_batch_duration(), Duration::ZERO);
    }

    #[test]
    fn test_mean_batch_duration() {
        let metrics = ConversionMetrics {
            batch_durations: vec![Duration::from_millis(100), Duration::from_millis(300)],
            ..ConversionMetrics::default()
        };
        assert_eq!(metrics.mean_batch_duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_compression_ratio_zero_input_is_zero() {
        let metrics = ConversionMetrics {
            output_bytes: 10,
            ..ConversionMetrics::default()
        };
        assert_eq!(metrics.compression_ratio(), 0.0);
    }

    #[test]
    fn test_compression_ratio_is_exact_quotient() {
        let metrics = ConversionMetrics {
            input_bytes: 400,
            output_bytes: 100,
            ..ConversionMetrics::default()
        };
        assert_eq!(metrics.compression_ratio(), 0.25);
    }

    #[test]
    fn test_recorder_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        let output = dir.path().join("out.parquet");
        std::fs::File::create(&input)
            .unwrap()
            .write_all(b"{\"a\": 1}\n")
            .unwrap();
        std::fs::File::create(&output)
            .unwrap()
            .write_all(&[0u8; 32])
            .unwrap();

        let mut recorder = MetricsRecorder::start(&input).unwrap();
        recorder.record_batch(Duration::from_millis(5), Duration::from_millis(2));
        let metrics = recorder.finish(&output);

        assert_eq!(metrics.input_bytes, 9);
        assert_eq!(metrics.output_bytes, 32);
        assert_eq!(metrics.batches(), 1);
        assert_eq!(metrics.compression_duration, Duration::from_millis(2));
        assert!(metrics.total_duration > Duration::ZERO);
    }

    #[test]
    fn test_recorder_missing_output_counts_zero() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        std::fs::File::create(&input)
            .unwrap()
            .write_all(b"{}\n")
            .unwrap();

        let recorder = MetricsRecorder::start(&input).unwrap();
        let metrics = recorder.finish(dir.path().join("never-written.parquet"));

        assert_eq!(metrics.output_bytes, 0);
        assert_eq!(metrics.batches(), 0);
    }

    #[test]
    fn test_recorder_missing_input_is_io_error() {
        let err = MetricsRecorder::start("/nonexistent/in.jsonl").unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }

    #[test]
    fn test_summary_display_handles_empty_metrics() {
        let metrics = ConversionMetrics::default();
        let summary = metrics.to_string();
        assert!(summary.contains("Batches processed: 0"));
        assert!(summary.contains("Compression ratio: 0.00%"));
    }
}
