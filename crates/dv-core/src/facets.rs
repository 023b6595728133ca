//! Per-column facet statistics used to populate filter widgets

use std::borrow::Cow;

use ahash::AHashMap;
use chrono::NaiveDate;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

use crate::column::{ColumnKind, ColumnSpec};
use crate::value::Record;

/// Lower and upper bound of a column's values
///
/// `Unbounded` means the column holds no usable value, and the widget
/// should not constrain anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Bounds<T> {
    Bounded { min: T, max: T },
    Unbounded,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Widen the bounds to include a value
    pub fn include(self, value: T) -> Self {
        match self {
            Bounds::Unbounded => Bounds::Bounded { min: value, max: value },
            Bounds::Bounded { min, max } => Bounds::Bounded {
                min: if value < min { value } else { min },
                max: if value > max { value } else { max },
            },
        }
    }

    /// `(min, max)` when bounded
    pub fn as_pair(&self) -> Option<(T, T)> {
        match self {
            Bounds::Bounded { min, max } => Some((*min, *max)),
            Bounds::Unbounded => None,
        }
    }
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Bounds::Unbounded
    }
}

/// A distinct value and how many records carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

impl FacetCount {
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Facet statistics for one column, shaped by its kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnFacet {
    /// Free text columns only report how many values are present
    Text { non_null: usize },

    /// Distinct values in first-seen order, with counts
    Categorical { options: Vec<FacetCount>, null_count: usize },

    NumericRange { bounds: Bounds<f64> },

    DateRange { bounds: Bounds<NaiveDate> },
}

impl ColumnFacet {
    /// Multi-select options, for categorical columns
    pub fn options(&self) -> Option<&[FacetCount]> {
        match self {
            ColumnFacet::Categorical { options, .. } => Some(options),
            _ => None,
        }
    }

    /// Slider bounds, for numeric columns
    pub fn numeric_bounds(&self) -> Option<Bounds<f64>> {
        match self {
            ColumnFacet::NumericRange { bounds } => Some(*bounds),
            _ => None,
        }
    }

    /// Picker bounds, for date columns
    pub fn date_bounds(&self) -> Option<Bounds<NaiveDate>> {
        match self {
            ColumnFacet::DateRange { bounds } => Some(*bounds),
            _ => None,
        }
    }
}

/// Facets for every column, in column order
pub type Facets = IndexMap<String, ColumnFacet>;

/// Compute facets for all columns of a record set
///
/// Columns are independent, so they are scanned in parallel.
pub fn compute_facets(records: &[Record], columns: &[ColumnSpec]) -> Facets {
    let facets: Vec<(String, ColumnFacet)> = columns
        .par_iter()
        .map(|column| (column.id.clone(), column_facet(records, column)))
        .collect();

    tracing::debug!("Computed facets for {} columns over {} records", facets.len(), records.len());

    facets.into_iter().collect()
}

/// Compute the facet of a single column
pub fn column_facet(records: &[Record], column: &ColumnSpec) -> ColumnFacet {
    match column.kind {
        ColumnKind::Text => ColumnFacet::Text {
            non_null: records.iter().filter(|r| !r.get(&column.id).is_null()).count(),
        },
        ColumnKind::Categorical => {
            let (options, null_count) = distinct_counts(records, &column.id);
            ColumnFacet::Categorical { options, null_count }
        }
        ColumnKind::NumericRange => ColumnFacet::NumericRange {
            bounds: numeric_bounds(records, &column.id),
        },
        ColumnKind::DateRange => ColumnFacet::DateRange {
            bounds: date_bounds(records, &column.id),
        },
    }
}

/// Distinct non-null values of a column in first-seen order, plus the null count
pub fn distinct_counts(records: &[Record], column: &str) -> (Vec<FacetCount>, usize) {
    let mut positions: AHashMap<Cow<'_, str>, usize> = AHashMap::new();
    let mut options: Vec<FacetCount> = Vec::new();
    let mut null_count = 0;

    for record in records {
        let Some(key) = record.get(column).facet_key() else {
            null_count += 1;
            continue;
        };

        match positions.get(&key) {
            Some(&idx) => options[idx].count += 1,
            None => {
                options.push(FacetCount::new(key.to_string(), 1));
                positions.insert(key, options.len() - 1);
            }
        }
    }

    (options, null_count)
}

/// Min and max over the non-null numeric values of a column
pub fn numeric_bounds(records: &[Record], column: &str) -> Bounds<f64> {
    records
        .iter()
        .filter_map(|record| record.get(column).as_number())
        .fold(Bounds::Unbounded, Bounds::include)
}

/// Earliest and latest parseable date of a column
pub fn date_bounds(records: &[Record], column: &str) -> Bounds<NaiveDate> {
    records
        .iter()
        .filter_map(|record| record.get(column).as_date())
        .fold(Bounds::Unbounded, Bounds::include)
}
