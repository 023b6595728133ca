use std::collections::HashSet;

use dv_core::{ColumnKind, ColumnSpec, Record, Value};

/// Kind detector for analyzing records and determining column kinds
pub struct KindDetector {
    sample_size: usize,
    categorical_max_distinct: usize,
}

/// Statistics about a sampled column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStats {
    pub sample_count: usize,
    pub null_count: usize,
    pub distinct_count: usize,
}

impl KindDetector {
    /// Create a new kind detector
    pub fn new() -> Self {
        Self {
            sample_size: 1000,
            categorical_max_distinct: 50,
        }
    }

    /// Set the sample size for detection
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size.max(1);
        self
    }

    /// Set the distinct-value limit for categorical columns
    pub fn with_categorical_max_distinct(mut self, limit: usize) -> Self {
        self.categorical_max_distinct = limit;
        self
    }

    /// Detect column specs from records
    ///
    /// Columns are listed in order of first appearance across the sample.
    pub fn detect(&self, records: &[Record]) -> Vec<ColumnSpec> {
        let samples = &records[..records.len().min(self.sample_size)];

        column_order(samples)
            .into_iter()
            .map(|column| {
                let (kind, stats) = self.analyze_column(samples, &column);
                tracing::debug!(
                    "Column '{}' detected as {} ({} distinct, {} null of {})",
                    column, kind.label(), stats.distinct_count, stats.null_count, stats.sample_count
                );
                ColumnSpec::new(column, kind)
            })
            .collect()
    }

    /// Analyze a single column
    fn analyze_column(&self, samples: &[Record], column: &str) -> (ColumnKind, ColumnStats) {
        let mut null_count = 0;
        let mut values: Vec<&Value> = Vec::new();
        let mut is_numeric = true;
        let mut is_date = true;

        for record in samples {
            let value = record.get(column);
            if value.is_null() {
                null_count += 1;
                continue;
            }

            if is_numeric && value.as_number().is_none() {
                is_numeric = false;
            }
            if is_date && value.as_date().is_none() {
                is_date = false;
            }
            values.push(value);
        }

        let distinct_count = values
            .iter()
            .filter_map(|value| value.facet_key())
            .collect::<HashSet<_>>()
            .len();

        let stats = ColumnStats {
            sample_count: samples.len(),
            null_count,
            distinct_count,
        };

        let kind = if values.is_empty() {
            ColumnKind::Text
        } else if is_numeric {
            ColumnKind::NumericRange
        } else if is_date {
            ColumnKind::DateRange
        } else if Self::is_categorical(distinct_count, values.len(), self.categorical_max_distinct) {
            ColumnKind::Categorical
        } else {
            ColumnKind::Text
        };

        (kind, stats)
    }

    /// Few distinct values that actually repeat
    fn is_categorical(distinct_count: usize, value_count: usize, limit: usize) -> bool {
        distinct_count <= limit && distinct_count < value_count
    }
}

impl Default for KindDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Column ids in order of first appearance
fn column_order(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for record in records {
        for column in record.columns() {
            if seen.insert(column) {
                order.push(column.to_string());
            }
        }
    }
    order
}
