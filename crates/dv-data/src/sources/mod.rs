//! Record sources for static datasets

pub mod csv_source;
pub mod json_source;

pub use csv_source::CsvSource;
pub use json_source::JsonSource;

use dv_core::Record;

use crate::DataError;

/// Something a dataset's records can be read from
pub trait RecordSource: Send + Sync {
    /// Read every record, in file order
    fn load(&self) -> Result<Vec<Record>, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}
