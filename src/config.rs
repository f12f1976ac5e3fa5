//! Conversion configuration
//!
//! Compression codec selection and streaming-path settings. Codec
//! validation happens here, before any file I/O takes place.

use crate::error::{Error, Result};
use parquet::basic::{BrotliLevel, Compression, GzipLevel};
use std::str::FromStr;

/// Default number of records per batch on the streaming path
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

// ============================================================================
// Compression Codec
// ============================================================================

/// Column compression codec applied to the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Codec {
    /// Fast compression (default)
    #[default]
    Snappy,
    /// Better compression ratio
    Gzip,
    /// Best compression ratio
    Brotli,
    /// No compression
    None,
}

impl Codec {
    /// Map to the parquet writer's compression setting
    pub fn to_compression(self) -> Compression {
        match self {
            Codec::Snappy => Compression::SNAPPY,
            Codec::Gzip => Compression::GZIP(GzipLevel::default()),
            Codec::Brotli => Compression::BROTLI(BrotliLevel::default()),
            Codec::None => Compression::UNCOMPRESSED,
        }
    }

    /// Codec name as accepted on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Codec::Snappy => "snappy",
            Codec::Gzip => "gzip",
            Codec::Brotli => "brotli",
            Codec::None => "none",
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "snappy" => Ok(Codec::Snappy),
            "gzip" => Ok(Codec::Gzip),
            "brotli" => Ok(Codec::Brotli),
            "none" => Ok(Codec::None),
            other => Err(Error::UnknownCodec {
                name: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// Conversion Config
// ============================================================================

/// Settings for one streaming conversion call
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Compression codec, fixed for the lifetime of the conversion
    pub codec: Codec,
    /// Records per batch; `None` means one batch for the whole file
    pub batch_size: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            codec: Codec::Snappy,
            batch_size: Some(DEFAULT_BATCH_SIZE),
        }
    }
}

impl ConversionConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression codec
    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the batch size
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Process the whole file as a single batch
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.batch_size = None;
        self
    }

    /// Validate the configuration
    ///
    /// A batch size of zero is rejected before any I/O occurs.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == Some(0) {
            return Err(Error::config("batch size must be positive"));
        }
        Ok(())
    }
}
