//! Sort criteria and cell ordering

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::column::ColumnKind;
use crate::value::Value;

/// One key of a multi-column sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// Ordered sort keys, the first being the primary one
///
/// A column appears at most once. No keys means input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortState {
    keys: Vec<SortKey>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Sort key of a column, if the column is sorted
    pub fn get(&self, column: &str) -> Option<&SortKey> {
        self.keys.iter().find(|key| key.column == column)
    }

    /// Sort a column in the given direction
    ///
    /// An already sorted column keeps its position and changes direction;
    /// a new one is appended as the lowest-priority key.
    pub fn set(&mut self, column: &str, descending: bool) {
        match self.keys.iter_mut().find(|key| key.column == column) {
            Some(key) => key.descending = descending,
            None => self.keys.push(SortKey {
                column: column.to_string(),
                descending,
            }),
        }
    }

    /// Advance a column through unsorted, ascending, descending and back
    pub fn toggle(&mut self, column: &str) {
        match self.get(column).map(|key| key.descending) {
            None => self.set(column, false),
            Some(false) => self.set(column, true),
            Some(true) => self.remove(column),
        }
    }

    pub fn remove(&mut self, column: &str) {
        self.keys.retain(|key| key.column != column);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

impl FromIterator<SortKey> for SortState {
    /// Later keys for an already listed column replace its direction
    fn from_iter<I: IntoIterator<Item = SortKey>>(iter: I) -> Self {
        let mut state = SortState::new();
        for key in iter {
            state.set(&key.column, key.descending);
        }
        state
    }
}

/// Order two cells of a column under one sort key
///
/// Nulls go last in both directions.
pub fn compare_cells(a: &Value, b: &Value, kind: ColumnKind, descending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_present(a, b, kind);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

/// Cells that parse for the column's kind come first, in parsed order; the
/// rest follow in plain value order.
fn compare_present(a: &Value, b: &Value, kind: ColumnKind) -> Ordering {
    match kind {
        ColumnKind::NumericRange => compare_parsed(a, b, Value::as_number, f64::total_cmp),
        ColumnKind::DateRange => compare_parsed(a, b, Value::as_date, NaiveDate::cmp),
        ColumnKind::Text | ColumnKind::Categorical => compare_plain(a, b),
    }
}

fn compare_parsed<T>(
    a: &Value,
    b: &Value,
    parse: impl Fn(&Value) -> Option<T>,
    compare: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (parse(a), parse(b)) {
        (Some(x), Some(y)) => compare(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_plain(a, b),
    }
}

/// Numbers before text, text by ordinal order
fn compare_plain(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Number(_), Value::Text(_)) => Ordering::Less,
        (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
    }
}
