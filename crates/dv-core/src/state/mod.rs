//! Table view state and the pure transitions that drive it
//!
//! Every transition takes the current state by reference and returns the
//! next one. The view layer owns the render loop and decides when to
//! re-apply the engine; nothing here triggers anything.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::column::{ColumnKind, ColumnSpec};
use crate::filter::{FilterCriterion, FilterSet};
use crate::sort::SortState;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which page of the derived rows is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Column visibility; columns not listed are visible
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityMap {
    columns: IndexMap<String, bool>,
}

impl VisibilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.columns.get(column).copied().unwrap_or(true)
    }

    pub fn set(&mut self, column: &str, visible: bool) {
        self.columns.insert(column.to_string(), visible);
    }

    /// Explicit entries, in the order they were first set
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.columns.iter().map(|(column, visible)| (column.as_str(), *visible))
    }

    /// Columns explicitly hidden
    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, visible)| !visible).map(|(column, _)| column)
    }
}

/// Everything the view layer can change about a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableState {
    /// Column filters, at most one per column
    pub filters: FilterSet,

    /// Free-text search across all columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_filter: Option<String>,

    pub sorting: SortState,

    pub visibility: VisibilityMap,

    /// Single-level grouping column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<String>,

    pub pagination: Pagination,
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace one column's filter; a cleared predicate removes it
    pub fn set_filter(&self, criterion: FilterCriterion) -> Self {
        let mut next = self.clone();
        next.filters.set(criterion);
        next.first_page()
    }

    /// Replace all column filters at once
    pub fn set_filters(&self, criteria: impl IntoIterator<Item = FilterCriterion>) -> Self {
        let mut next = self.clone();
        next.filters = criteria.into_iter().collect();
        next.first_page()
    }

    pub fn clear_filter(&self, column: &str) -> Self {
        let mut next = self.clone();
        next.filters.remove(column);
        next.first_page()
    }

    /// Drop every column filter and the global search
    pub fn clear_filters(&self) -> Self {
        let mut next = self.clone();
        next.filters.clear();
        next.global_filter = None;
        next.first_page()
    }

    /// Set the global search; empty text clears it
    pub fn set_global_filter(&self, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut next = self.clone();
        next.global_filter = (!text.is_empty()).then_some(text);
        next.first_page()
    }

    /// Cycle a column through ascending, descending and unsorted
    pub fn toggle_sort(&self, column: &str) -> Self {
        let mut next = self.clone();
        next.sorting.toggle(column);
        next.first_page()
    }

    pub fn set_sort(&self, column: &str, descending: bool) -> Self {
        let mut next = self.clone();
        next.sorting.set(column, descending);
        next.first_page()
    }

    pub fn clear_sort(&self) -> Self {
        let mut next = self.clone();
        next.sorting.clear();
        next.first_page()
    }

    pub fn set_column_visibility(&self, column: &str, visible: bool) -> Self {
        let mut next = self.clone();
        next.visibility.set(column, visible);
        next
    }

    pub fn show_all_columns(&self, columns: &[ColumnSpec]) -> Self {
        self.set_all_visibility(columns, true)
    }

    pub fn hide_all_columns(&self, columns: &[ColumnSpec]) -> Self {
        self.set_all_visibility(columns, false)
    }

    fn set_all_visibility(&self, columns: &[ColumnSpec], visible: bool) -> Self {
        let mut next = self.clone();
        for column in columns {
            next.visibility.set(&column.id, visible);
        }
        next
    }

    /// Group rows by a column; an empty id clears grouping
    pub fn set_grouping(&self, column: &str) -> Self {
        let mut next = self.clone();
        next.grouping = (!column.is_empty()).then(|| column.to_string());
        next.first_page()
    }

    pub fn clear_grouping(&self) -> Self {
        let mut next = self.clone();
        next.grouping = None;
        next.first_page()
    }

    pub fn set_page(&self, page_index: usize) -> Self {
        let mut next = self.clone();
        next.pagination.page_index = page_index;
        next
    }

    /// Change the page size and return to the first page; zero is ignored
    pub fn set_page_size(&self, page_size: usize) -> Self {
        if page_size == 0 {
            return self.clone();
        }
        let mut next = self.clone();
        next.pagination.page_size = page_size;
        next.first_page()
    }

    /// Global search text, `None` when absent or empty
    pub fn search_text(&self) -> Option<&str> {
        self.global_filter.as_deref().filter(|text| !text.is_empty())
    }

    fn first_page(mut self) -> Self {
        self.pagination.page_index = 0;
        self
    }
}

/// Columns that may be offered for grouping
///
/// Only discrete columns make meaningful groups.
pub fn grouping_candidates(columns: &[ColumnSpec]) -> impl Iterator<Item = &ColumnSpec> {
    columns
        .iter()
        .filter(|column| column.kind == ColumnKind::Categorical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPredicate;
    use crate::sort::SortKey;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::text("name"),
            ColumnSpec::categorical("category"),
            ColumnSpec::numeric("price"),
        ]
    }

    #[test]
    fn test_transitions_leave_previous_state_untouched() {
        let before = TableState::new();
        let after = before.set_filter(FilterCriterion::new("name", FilterPredicate::contains("w")));

        assert!(before.filters.is_empty());
        assert_eq!(after.filters.len(), 1);
    }

    #[test]
    fn test_clearing_filter_value_removes_criterion() {
        let state = TableState::new()
            .set_filter(FilterCriterion::new("category", FilterPredicate::in_set(["Tools"])))
            .set_filter(FilterCriterion::new("category", FilterPredicate::in_set(Vec::<String>::new())));

        assert!(state.filters.is_empty());
        assert_eq!(state, TableState::new());
    }

    #[test]
    fn test_empty_search_is_absent() {
        let state = TableState::new().set_global_filter("gad").set_global_filter("");
        assert_eq!(state.global_filter, None);
        assert_eq!(state.search_text(), None);
    }

    #[test]
    fn test_changes_reset_page_index() {
        let paged = TableState::new().set_page(3);
        assert_eq!(paged.pagination.page_index, 3);

        assert_eq!(paged.toggle_sort("price").pagination.page_index, 0);
        assert_eq!(paged.set_grouping("category").pagination.page_index, 0);
        assert_eq!(paged.set_global_filter("x").pagination.page_index, 0);
        assert_eq!(
            paged
                .set_filter(FilterCriterion::new("price", FilterPredicate::numeric_range(1.0, 2.0)))
                .pagination
                .page_index,
            0
        );
        // Visibility does not change which rows exist
        assert_eq!(paged.set_column_visibility("price", false).pagination.page_index, 3);
    }

    #[test]
    fn test_toggle_sort_cycle() {
        let state = TableState::new().toggle_sort("price");
        assert_eq!(state.sorting.keys(), &[SortKey::ascending("price")]);

        let state = state.toggle_sort("price");
        assert_eq!(state.sorting.keys(), &[SortKey::descending("price")]);

        let state = state.toggle_sort("price");
        assert!(state.sorting.is_empty());
    }

    #[test]
    fn test_show_all_columns() {
        let columns = columns();
        let hidden = TableState::new().hide_all_columns(&columns);
        assert!(columns.iter().all(|c| !hidden.visibility.is_visible(&c.id)));

        let shown = hidden.show_all_columns(&columns);
        assert!(columns.iter().all(|c| shown.visibility.is_visible(&c.id)));
        assert_eq!(shown.visibility.hidden().count(), 0);
    }

    #[test]
    fn test_grouping_set_and_clear() {
        let state = TableState::new().set_grouping("category");
        assert_eq!(state.grouping.as_deref(), Some("category"));
        assert_eq!(state.clear_grouping().grouping, None);
        assert_eq!(state.set_grouping("").grouping, None);
    }

    #[test]
    fn test_zero_page_size_is_ignored() {
        let state = TableState::new().set_page_size(0);
        assert_eq!(state.pagination.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(state.set_page_size(25).pagination.page_size, 25);
    }

    #[test]
    fn test_grouping_candidates_are_categorical() {
        let columns = columns();
        let ids: Vec<_> = grouping_candidates(&columns).map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["category"]);
    }

    #[test]
    fn test_state_from_partial_json() {
        let state: TableState = serde_json::from_str(
            r#"{"sorting": [{"column": "price", "descending": true}], "grouping": "category"}"#,
        ).unwrap();

        assert_eq!(state.sorting.keys(), &[SortKey::descending("price")]);
        assert_eq!(state.grouping.as_deref(), Some("category"));
        assert_eq!(state.pagination, Pagination::default());
    }
}
