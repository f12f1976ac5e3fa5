//! Command-line interface
//!
//! One command: convert a JSONL file to Parquet, printing a metrics
//! summary on success.

use crate::config::{Codec, ConversionConfig, DEFAULT_BATCH_SIZE};
use crate::convert::convert_jsonl_to_parquet;
use clap::Parser;
use std::path::PathBuf;

/// Convert JSONL files to Parquet format
#[derive(Parser, Debug)]
#[command(name = "parquetize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input JSONL file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output Parquet file path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Compression codec to use
    #[arg(short, long, default_value = "snappy")]
    pub compression: Codec,

    /// Number of records to process at once
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

/// Run a conversion from parsed arguments
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ConversionConfig::new()
        .with_codec(cli.compression)
        .with_batch_size(cli.batch_size);

    let metrics = convert_jsonl_to_parquet(&cli.input, &cli.output, &config)?;
    println!("{metrics}");
    Ok(())
}
