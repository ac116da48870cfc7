//! Batch Pipeline Module
//! Drives fetch → parse → clean per source item, then aggregates and
//! persists the three output tables.

use polars::prelude::DataFrame;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::data::{AggregateError, CleanError, DataLoader, DatasetAggregator, LoaderError, RecordCleaner};
use crate::storage::{StorageError, StorageGateway};

/// Logical output names, fixed across runs.
pub const UNIFIED_OUTPUT: &str = "all_cleaned";
pub const BENIGN_OUTPUT: &str = "all_benign";
pub const MALICIOUS_OUTPUT: &str = "all_malicious";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No source item produced a usable table ({attempted} attempted)")]
    EmptyBatch { attempted: usize },
    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Why a single source item was skipped. Item failures never abort the
/// batch; they are collected here instead.
#[derive(Error, Debug)]
enum ItemError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] StorageError),
    #[error("parse failed: {0}")]
    Parse(#[from] LoaderError),
    #[error("clean failed: {0}")]
    Clean(#[from] CleanError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub key: String,
    pub reason: String,
}

/// Outcome report of one batch run.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: Vec<SkippedItem>,
    pub unified_rows: usize,
    pub unified_cols: usize,
    pub benign_rows: usize,
    pub malicious_rows: usize,
}

/// Requests a stop between items; the in-flight item always drains.
#[derive(Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Sequential batch driver with per-item failure isolation.
pub struct BatchPipeline {
    gateway: Box<dyn StorageGateway>,
    prefix: String,
    cancel: CancelHandle,
}

impl BatchPipeline {
    pub fn new(gateway: Box<dyn StorageGateway>, prefix: impl Into<String>) -> Self {
        Self {
            gateway,
            prefix: prefix.into(),
            cancel: CancelHandle::default(),
        }
    }

    /// Handle for requesting a stop at item granularity.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run the whole batch and persist the three outputs.
    ///
    /// A failing item is skipped with its reason logged; only an unusable
    /// batch (zero cleaned tables), a schema mismatch during aggregation,
    /// or an output storage failure aborts the run.
    pub fn run(&self) -> Result<BatchSummary, PipelineError> {
        let keys: Vec<String> = self
            .gateway
            .list(&self.prefix)?
            .into_iter()
            .filter(|k| k.ends_with(".csv"))
            .collect();
        info!(count = keys.len(), prefix = %self.prefix, "found source files");

        let mut cleaned: Vec<DataFrame> = Vec::new();
        let mut skipped: Vec<SkippedItem> = Vec::new();
        let mut attempted = 0usize;

        for key in &keys {
            if self.cancel.is_cancelled() {
                info!("cancellation requested, stopping before next item");
                break;
            }
            attempted += 1;
            match self.process_item(key) {
                Ok(table) => {
                    info!(key = %key, rows = table.height(), "cleaned source file");
                    cleaned.push(table);
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "skipping source file");
                    skipped.push(SkippedItem {
                        key: key.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if cleaned.is_empty() {
            return Err(PipelineError::EmptyBatch { attempted });
        }
        let succeeded = cleaned.len();

        // `cleaned` moves into the aggregator; the per-item buffer is gone
        // before the unified table is persisted.
        let (mut unified, mut benign, mut malicious) = DatasetAggregator::aggregate(cleaned)?;

        let summary = BatchSummary {
            attempted,
            succeeded,
            skipped,
            unified_rows: unified.height(),
            unified_cols: unified.width(),
            benign_rows: benign.height(),
            malicious_rows: malicious.height(),
        };

        self.gateway.store(UNIFIED_OUTPUT, &mut unified)?;
        self.gateway.store(BENIGN_OUTPUT, &mut benign)?;
        self.gateway.store(MALICIOUS_OUTPUT, &mut malicious)?;

        info!(
            unified = summary.unified_rows,
            benign = summary.benign_rows,
            malicious = summary.malicious_rows,
            "batch complete"
        );
        Ok(summary)
    }

    fn process_item(&self, key: &str) -> Result<DataFrame, ItemError> {
        let bytes = self.gateway.fetch(key)?;
        let raw = DataLoader::parse_bytes(&bytes)?;
        drop(bytes);
        let table = RecordCleaner::clean(raw)?;
        Ok(table)
    }
}
