//! Storage Gateway Port
//! The pipeline's view of the blob store holding raw inputs and outputs.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Transient storage failure: {0}")]
    Transient(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Blob-store collaborator. Calls are plain blocking I/O; retry and
/// timeout policy live behind the implementation, not in the pipeline.
pub trait StorageGateway {
    /// List object keys under a prefix.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Fetch one object's bytes.
    fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Persist a table under a logical output name, keeping the dtypes
    /// and row order it arrives with.
    fn store(&self, name: &str, table: &mut DataFrame) -> Result<(), StorageError>;
}
