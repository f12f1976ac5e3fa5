//! # parquetize
//!
//! Chunked JSONL to Parquet converter with nested-structure flattening.
//!
//! ## Features
//!
//! - **Chunked processing**: bounded-size batches keep peak memory flat
//! - **Nested structure handling**: object columns flatten to dotted
//!   columns, list columns become opaque JSON text
//! - **Compression options**: snappy, gzip, brotli or none
//! - **Performance metrics**: per-batch timing and byte accounting
//! - **Fixed-schema path**: non-chunked conversion against a declared
//!   column-type mapping
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parquetize::{convert_jsonl_to_parquet, ConversionConfig, Codec};
//!
//! let config = ConversionConfig::new()
//!     .with_codec(Codec::Gzip)
//!     .with_batch_size(50_000);
//!
//! let metrics = convert_jsonl_to_parquet("input.jsonl", "output.parquet", &config)?;
//! println!("{metrics}");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐    ┌───────────┐    ┌──────────────────┐
//! │   Reader   │ -> │ Flattener │ -> │ Incremental sink │
//! │ (batches)  │    │ (dotted / │    │ (row groups      │
//! │            │    │  JSON txt)│    │  per batch)      │
//! └────────────┘    └───────────┘    └──────────────────┘
//!        └──────── metrics recorder observes ─────────┘
//! ```
//!
//! The fixed-schema path ([`convert_with_schema`]) bypasses batching and
//! flattening, coercing the whole input against a [`SchemaMapping`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common type aliases
pub mod types;

/// Conversion configuration and codecs
pub mod config;

/// JSONL batch reader
pub mod reader;

/// Nested-structure flattener
pub mod flatten;

/// Arrow conversion and Parquet writing
pub mod output;

/// Conversion metrics
pub mod metrics;

/// Streaming conversion pipeline
pub mod convert;

/// Fixed-schema conversion
pub mod schema;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{Codec, ConversionConfig, DEFAULT_BATCH_SIZE};
pub use convert::{convert_jsonl_to_parquet, ConversionError, ConversionResult};
pub use error::{Error, Result};
pub use metrics::ConversionMetrics;
pub use schema::{convert_with_schema, ColumnType, SchemaMapping};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
