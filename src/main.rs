//! flowprep - network-flow dataset cleaning & partitioning pipeline
//!
//! Fetches raw CSV flow records from a blob store, cleans each file,
//! unifies the survivors and splits them into benign and malicious
//! Parquet outputs.

mod config;
mod data;
mod pipeline;
mod storage;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Cli;
use pipeline::BatchPipeline;
use storage::LocalBlobStore;

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowprep=info")),
        )
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let store = LocalBlobStore::new(&cli.source, &cli.output);
    let pipeline = BatchPipeline::new(Box::new(store), cli.prefix);

    let summary = pipeline.run().context("batch run failed")?;

    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        skipped = summary.skipped.len(),
        "source files processed"
    );
    for item in &summary.skipped {
        warn!(key = %item.key, reason = %item.reason, "item was skipped");
    }
    info!(
        unified = summary.unified_rows,
        benign = summary.benign_rows,
        malicious = summary.malicious_rows,
        "output row counts"
    );

    if cli.json_summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
