//! Dataset loading for the data viewer
//!
//! Reads a static dataset (JSON array of objects, or headered CSV) into
//! records, infers column kinds when none are configured, and memoizes
//! facet statistics per dataset.

pub mod cache;
pub mod config;
pub mod dataset;
pub mod schema;
pub mod sources;

use dv_core::EngineError;
use thiserror::Error;

// Re-exports
pub use cache::FacetCache;
pub use config::{DatasetConfig, FileFormat, NullConfig};
pub use dataset::Dataset;
pub use schema::{ColumnStats, KindDetector};
pub use sources::{CsvSource, JsonSource, RecordSource};

/// Errors that can occur while loading a dataset
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed dataset: {0}")]
    Malformed(String),

    #[error("Invalid columns: {0}")]
    Schema(#[from] EngineError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}
