//! Pipeline module - batch orchestration

mod batch;

pub use batch::{
    BatchPipeline, BatchSummary, CancelHandle, PipelineError, SkippedItem, BENIGN_OUTPUT,
    MALICIOUS_OUTPUT, UNIFIED_OUTPUT,
};
