//! Command-line configuration

use clap::Parser;
use std::path::PathBuf;

/// Clean raw network-flow CSV files and persist the unified, benign and
/// malicious tables as Parquet.
#[derive(Parser, Debug)]
#[command(name = "flowprep", version, about)]
pub struct Cli {
    /// Directory holding the raw source files
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,

    /// Key prefix selecting the source files to process
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Directory the output Parquet files are written to
    #[arg(long, value_name = "DIR")]
    pub output: PathBuf,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json_summary: bool,
}
