//! Table state engine: derives grid rows from records and state
//!
//! The engine is a pure function of its inputs. It filters, sorts and groups
//! a borrowed record set on each call and keeps nothing between calls.

use std::fmt;

use ahash::AHashMap;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::column::{ColumnKind, ColumnSpec};
use crate::error::EngineError;
use crate::facets::{self, Facets};
use crate::filter::{FilterPredicate, FilterSet, Matcher};
use crate::sort::{compare_cells, SortState};
use crate::state::{grouping_candidates, Pagination, TableState};
use crate::value::{Record, Value};

/// Value of the grouping column shared by a run of rows
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Value(String),
    /// Rows with no value in the grouping column
    Empty,
}

impl GroupKey {
    fn of(value: &Value) -> Self {
        match value.facet_key() {
            Some(key) => GroupKey::Value(key.into_owned()),
            None => GroupKey::Empty,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Value(value) => f.write_str(value),
            GroupKey::Empty => f.write_str("(empty)"),
        }
    }
}

/// A group and how many rows it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub key: GroupKey,
    pub rows: usize,
}

/// One derived row of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'r> {
    /// Position of the record in the input set
    pub index: usize,
    pub record: &'r Record,
    /// Group tag, present only when grouping is active
    pub group: Option<GroupKey>,
}

impl<'r> GridRow<'r> {
    pub fn value(&self, column: &str) -> &'r Value {
        self.record.get(column)
    }
}

/// Result of applying a table state to a record set
#[derive(Debug, Clone)]
pub struct GridView<'r> {
    /// Filtered, sorted and grouped rows
    pub rows: Vec<GridRow<'r>>,

    /// Groups in display order; empty when not grouped
    pub groups: Vec<GroupSummary>,

    /// Visible columns in column order
    pub columns: Vec<ColumnSpec>,

    /// Size of the unfiltered record set
    pub total_records: usize,
}

impl<'r> GridView<'r> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_grouped(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Input positions of the rows, in display order
    pub fn indices(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.index).collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &'r Record> + '_ {
        self.rows.iter().map(|row| row.record)
    }

    /// Number of pages at the given page size
    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.rows.len().div_ceil(page_size)
    }

    /// Rows on one page; past the last page this is empty
    pub fn page(&self, pagination: Pagination) -> &[GridRow<'r>] {
        if pagination.page_size == 0 {
            return &[];
        }
        let start = pagination.page_index.saturating_mul(pagination.page_size);
        if start >= self.rows.len() {
            return &[];
        }
        let end = start.saturating_add(pagination.page_size).min(self.rows.len());
        &self.rows[start..end]
    }
}

/// Derives grid rows and facets for a fixed set of columns
#[derive(Debug, Clone)]
pub struct TableStateEngine {
    columns: Vec<ColumnSpec>,
    positions: AHashMap<String, usize>,
}

impl TableStateEngine {
    /// Create an engine over a column set
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, EngineError> {
        let mut positions = AHashMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            if column.id.is_empty() {
                return Err(EngineError::EmptyColumnId);
            }
            if positions.insert(column.id.clone(), idx).is_some() {
                return Err(EngineError::DuplicateColumn(column.id.clone()));
            }
        }

        Ok(Self { columns, positions })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnSpec> {
        self.positions.get(id).map(|&idx| &self.columns[idx])
    }

    /// Columns the view layer may offer for grouping
    pub fn grouping_candidates(&self) -> impl Iterator<Item = &ColumnSpec> {
        grouping_candidates(&self.columns)
    }

    /// Facet statistics for every column over the given records
    pub fn compute_facets(&self, records: &[Record]) -> Facets {
        facets::compute_facets(records, &self.columns)
    }

    /// Visible columns under the state, in column order
    pub fn visible_columns(&self, state: &TableState) -> Vec<ColumnSpec> {
        for (column, _) in state.visibility.iter() {
            if self.column(column).is_none() {
                debug!("Ignoring visibility of unknown column '{}'", column);
            }
        }

        self.columns
            .iter()
            .filter(|column| state.visibility.is_visible(&column.id))
            .cloned()
            .collect()
    }

    /// Input positions of the records that pass the filters, in input order
    pub fn matching_indices(&self, records: &[Record], state: &TableState) -> Vec<usize> {
        self.filter_rows(records, state)
            .into_iter()
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Filter, sort and group the records under the state
    pub fn apply<'r>(&self, records: &'r [Record], state: &TableState) -> GridView<'r> {
        let mut rows = self.filter_rows(records, state);
        debug!("{} of {} records pass the filters", rows.len(), records.len());

        self.sort_rows(&mut rows, &state.sorting);

        let (rows, groups) = match self.grouping_column(state) {
            Some(column) => group_rows(rows, column),
            None => (
                rows.into_iter()
                    .map(|(index, record)| GridRow { index, record, group: None })
                    .collect(),
                Vec::new(),
            ),
        };

        GridView {
            rows,
            groups,
            columns: self.visible_columns(state),
            total_records: records.len(),
        }
    }

    /// Filters that actually constrain rows, with their columns
    ///
    /// Unknown columns are skipped, cleared predicates dropped and numeric
    /// ranges spanning the whole column treated as absent.
    fn active_filters(&self, records: &[Record], filters: &FilterSet) -> Vec<(&str, FilterPredicate)> {
        filters
            .iter()
            .filter_map(|(column, predicate)| {
                let Some(spec) = self.column(column) else {
                    debug!("Ignoring filter on unknown column '{}'", column);
                    return None;
                };

                let predicate = predicate.clone().normalize()?;
                if matches!(predicate, FilterPredicate::NumericRange { .. })
                    && predicate.covers(&facets::numeric_bounds(records, &spec.id))
                {
                    debug!("Range filter on '{}' spans all values, skipping", column);
                    return None;
                }

                Some((spec.id.as_str(), predicate))
            })
            .collect()
    }

    fn filter_rows<'r>(&self, records: &'r [Record], state: &TableState) -> Vec<(usize, &'r Record)> {
        let active = self.active_filters(records, &state.filters);
        let matchers: Vec<(&str, Matcher<'_>)> = active
            .iter()
            .map(|(column, predicate)| (*column, predicate.matcher()))
            .collect();
        let search = state.search_text().map(str::to_lowercase);

        records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                matchers
                    .iter()
                    .all(|(column, matcher)| matcher.matches(record.get(column)))
            })
            .filter(|(_, record)| match &search {
                Some(needle) => self.matches_search(record, needle),
                None => true,
            })
            .collect()
    }

    /// Global search: any known column containing the lower-cased needle
    fn matches_search(&self, record: &Record, needle: &str) -> bool {
        self.columns.iter().any(|column| {
            record
                .get(&column.id)
                .to_text()
                .to_lowercase()
                .contains(needle)
        })
    }

    fn sort_rows(&self, rows: &mut [(usize, &Record)], sorting: &SortState) {
        let mut keys: Vec<(&str, ColumnKind, bool)> = Vec::with_capacity(sorting.len());
        for key in sorting.keys() {
            match self.column(&key.column) {
                Some(spec) if !keys.iter().any(|(id, _, _)| *id == spec.id) => {
                    keys.push((spec.id.as_str(), spec.kind, key.descending));
                }
                Some(_) => {}
                None => debug!("Ignoring sort on unknown column '{}'", key.column),
            }
        }

        if keys.is_empty() {
            return;
        }

        // Stable: ties keep input order
        rows.sort_by(|(_, a), (_, b)| {
            keys.iter()
                .map(|(column, kind, descending)| {
                    compare_cells(a.get(column), b.get(column), *kind, *descending)
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    fn grouping_column(&self, state: &TableState) -> Option<&str> {
        let column = state.grouping.as_deref().filter(|column| !column.is_empty())?;
        match self.column(column) {
            Some(spec) => Some(spec.id.as_str()),
            None => {
                debug!("Ignoring grouping by unknown column '{}'", column);
                None
            }
        }
    }
}

/// Gather sorted rows into groups by first appearance, keeping sort order within each
fn group_rows<'r>(rows: Vec<(usize, &'r Record)>, column: &str) -> (Vec<GridRow<'r>>, Vec<GroupSummary>) {
    let mut groups: IndexMap<GroupKey, Vec<(usize, &'r Record)>> = IndexMap::new();
    for (index, record) in rows {
        groups
            .entry(GroupKey::of(record.get(column)))
            .or_default()
            .push((index, record));
    }

    let summaries = groups
        .iter()
        .map(|(key, members)| GroupSummary {
            key: key.clone(),
            rows: members.len(),
        })
        .collect();

    let rows = groups
        .into_iter()
        .flat_map(|(key, members)| {
            members.into_iter().map(move |(index, record)| GridRow {
                index,
                record,
                group: Some(key.clone()),
            })
        })
        .collect();

    (rows, summaries)
}
