//! JSON array-of-objects data source

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use dv_core::Record;
use tracing::{info, warn};

use super::RecordSource;
use crate::DataError;

/// Reads a file holding a JSON array of objects, one object per record
pub struct JsonSource {
    path: PathBuf,
    name: String,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.json")
            .to_string();
        Self { path, name }
    }

    /// Parse records from any reader
    ///
    /// Array elements that are not objects are skipped with a warning.
    pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>, DataError> {
        let document: serde_json::Value = serde_json::from_reader(reader)?;
        let serde_json::Value::Array(items) = document else {
            return Err(DataError::Malformed("expected a JSON array of objects".to_string()));
        };

        let mut records = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            match item {
                serde_json::Value::Object(fields) => {
                    records.push(fields.into_iter().collect::<Record>());
                }
                other => warn!("Skipping element {} of JSON dataset: not an object ({})", idx, other),
            }
        }

        Ok(records)
    }
}

impl RecordSource for JsonSource {
    fn load(&self) -> Result<Vec<Record>, DataError> {
        let file = File::open(&self.path)?;
        let records = Self::read_records(BufReader::new(file))?;
        info!("Loaded {} records from {}", records.len(), self.name);
        Ok(records)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
