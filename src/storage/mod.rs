//! Storage module - blob-store gateway and the local filesystem adapter

mod gateway;
mod local;

pub use gateway::{StorageError, StorageGateway};
pub use local::LocalBlobStore;
