//! A loaded dataset with its columns and cached facets

use std::sync::Arc;

use dv_core::{ColumnSpec, Facets, Record, TableStateEngine};
use tracing::info;

use crate::cache::FacetCache;
use crate::config::{DatasetConfig, FileFormat};
use crate::schema::KindDetector;
use crate::sources::{CsvSource, JsonSource, RecordSource};
use crate::DataError;

/// An immutable dataset: records, their columns and a facet cache
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    columns: Vec<ColumnSpec>,
    records: Arc<Vec<Record>>,
    facets: FacetCache,
}

impl Dataset {
    /// Load a dataset as described by its configuration
    ///
    /// Columns come from the configuration when listed there; otherwise they
    /// are inferred from a sample of the records and the configured kind and
    /// header overrides applied.
    pub fn load(config: &DatasetConfig) -> Result<Self, DataError> {
        let source: Box<dyn RecordSource> = match config.resolved_format()? {
            FileFormat::Json => Box::new(JsonSource::new(&config.path)),
            FileFormat::Csv => {
                Box::new(CsvSource::new(&config.path).with_null_config(config.null_config.clone()))
            }
        };
        let records = source.load()?;

        let columns = if config.columns.is_empty() {
            let detected = KindDetector::new()
                .with_sample_size(config.sample_size)
                .with_categorical_max_distinct(config.categorical_max_distinct)
                .detect(&records);
            config.apply_overrides(detected)
        } else {
            config.columns.clone()
        };

        let dataset = Self::from_records(config.display_name(), columns, records)?;
        info!(
            "Dataset '{}' ready: {} records, {} columns",
            dataset.name,
            dataset.records.len(),
            dataset.columns.len()
        );
        Ok(dataset)
    }

    /// Build a dataset from records already in memory
    pub fn from_records(
        name: impl Into<String>,
        columns: Vec<ColumnSpec>,
        records: Vec<Record>,
    ) -> Result<Self, DataError> {
        // Validate the column set up front
        TableStateEngine::new(columns.clone())?;

        Ok(Self {
            name: name.into(),
            columns,
            records: Arc::new(records),
            facets: FacetCache::new(),
        })
    }

    /// An engine over this dataset's columns
    pub fn engine(&self) -> Result<TableStateEngine, DataError> {
        Ok(TableStateEngine::new(self.columns.clone())?)
    }

    /// Facets for every column, memoized
    pub fn facets(&self) -> Facets {
        self.facets.get_or_compute(&self.records, &self.columns)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
