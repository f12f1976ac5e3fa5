//! Error types for parquetize
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for parquetize
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Invalid conversion settings, rejected before any I/O
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// Compression codec name outside the supported set
    #[error("Unknown compression codec '{name}' (expected snappy, gzip, brotli or none)")]
    UnknownCodec {
        /// The rejected codec name
        name: String,
    },

    // ============================================================================
    // Input Errors
    // ============================================================================
    /// Missing or unreadable input, or unwritable output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line that is not a JSON object
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based input line number
        line: usize,
        /// What failed to parse
        message: String,
    },

    // ============================================================================
    // Output Errors
    // ============================================================================
    /// The columnar encoder rejected a batch
    #[error("Write error: {message}")]
    Write {
        /// What the encoder rejected
        message: String,
    },

    /// Error surfaced by the arrow conversion layer
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error surfaced by the parquet encoder
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    // ============================================================================
    // Fixed-Schema Errors
    // ============================================================================
    /// Coercion or projection failure on the fixed-schema path
    #[error("Schema error for column '{column}': {message}")]
    Schema {
        /// The column that failed
        column: String,
        /// Why coercion or projection failed
        message: String,
    },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a parse error for a 1-based input line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Create a schema error for a named column
    pub fn schema(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for parquetize
pub type Result<T> = std::result::Result<T, Error>;
