//! Local Blob Store
//! Directory-backed gateway: keys are slash-separated paths relative to the
//! source root; outputs land as Parquet files under the output root.

use polars::prelude::*;
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

use super::gateway::{StorageError, StorageGateway};

pub struct LocalBlobStore {
    source_root: PathBuf,
    output_root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
        }
    }

    fn collect_keys(
        &self,
        dir: &Path,
        keys: &mut Vec<String>,
    ) -> Result<(), StorageError> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.collect_keys(&path, keys)?;
            } else if let Ok(rel) = path.strip_prefix(&self.source_root) {
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                keys.push(key);
            }
        }
        Ok(())
    }
}

impl StorageGateway for LocalBlobStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        self.collect_keys(&self.source_root, &mut keys)?;
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }

    fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.source_root.join(key);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            ErrorKind::Interrupted | ErrorKind::TimedOut => {
                StorageError::Transient(e.to_string())
            }
            _ => StorageError::Io(e),
        })
    }

    fn store(&self, name: &str, table: &mut DataFrame) -> Result<(), StorageError> {
        fs::create_dir_all(&self.output_root)?;
        let path = self.output_root.join(format!("{name}.parquet"));
        let file = File::create(&path)?;
        ParquetWriter::new(file).finish(table)?;
        info!(output = %path.display(), rows = table.height(), "stored table");
        Ok(())
    }
}
