//! Data module - CSV parsing, cleaning and aggregation

mod aggregator;
mod cleaner;
mod loader;
mod schema;

pub use aggregator::{AggregateError, DatasetAggregator};
pub use cleaner::{CleanError, RecordCleaner, BENIGN_LABEL, LABEL_COLUMN};
pub use loader::{DataLoader, LoaderError};
pub use schema::ColumnType;
