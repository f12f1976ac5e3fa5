//! Output module
//!
//! Handles Arrow RecordBatch creation and incremental Parquet writing.

mod schema;
mod writer;

pub use schema::{arrow_to_json, batch_to_arrow};
pub use writer::ParquetSink;

pub(crate) use schema::parse_datetime_nanos;

#[cfg(test)]
mod tests;
