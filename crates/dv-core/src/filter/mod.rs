//! Filter criteria and their evaluation against cell values

mod date;

pub use date::parse_date;

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::facets::Bounds;
use crate::value::Value;

/// The rule a filter applies to one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterPredicate {
    /// Case-insensitive substring match on the value's text form
    TextContains { text: String },

    /// Exact match against one of the selected values
    InSet { values: IndexSet<String> },

    /// Inclusive numeric range
    NumericRange { min: f64, max: f64 },

    /// Inclusive date range, open-ended on a missing bound
    DateRange {
        #[serde(default)]
        start: Option<NaiveDate>,
        #[serde(default)]
        end: Option<NaiveDate>,
    },
}

impl FilterPredicate {
    pub fn contains(text: impl Into<String>) -> Self {
        FilterPredicate::TextContains { text: text.into() }
    }

    pub fn in_set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterPredicate::InSet {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn numeric_range(min: f64, max: f64) -> Self {
        FilterPredicate::NumericRange { min, max }
    }

    pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        FilterPredicate::DateRange { start, end }
    }

    /// Whether the predicate carries no constraint at all
    ///
    /// A cleared predicate is the same as no criterion and is never stored.
    pub fn is_cleared(&self) -> bool {
        match self {
            FilterPredicate::TextContains { text } => text.is_empty(),
            FilterPredicate::InSet { values } => values.is_empty(),
            FilterPredicate::NumericRange { min, max } => min.is_nan() || max.is_nan(),
            FilterPredicate::DateRange { start, end } => start.is_none() && end.is_none(),
        }
    }

    /// Canonical form of the predicate, or `None` when it is cleared
    ///
    /// Reversed range bounds are swapped.
    pub fn normalize(self) -> Option<Self> {
        if self.is_cleared() {
            return None;
        }

        Some(match self {
            FilterPredicate::NumericRange { min, max } if min > max => {
                FilterPredicate::NumericRange { min: max, max: min }
            }
            FilterPredicate::DateRange { start: Some(start), end: Some(end) } if start > end => {
                FilterPredicate::DateRange { start: Some(end), end: Some(start) }
            }
            other => other,
        })
    }

    /// Whether a numeric range is exactly the column's full data bounds
    ///
    /// Such a range keeps every record, including ones with no value. A
    /// column without any numeric value has nothing to narrow, so any range
    /// covers it. A wider range is a real constraint and drops nulls.
    pub fn covers(&self, bounds: &Bounds<f64>) -> bool {
        match (self, bounds) {
            (FilterPredicate::NumericRange { .. }, Bounds::Unbounded) => true,
            (FilterPredicate::NumericRange { min, max }, Bounds::Bounded { min: lo, max: hi }) => {
                let (min, max) = if min > max { (max, min) } else { (min, max) };
                min == lo && max == hi
            }
            _ => false,
        }
    }

    /// Evaluate the predicate against a single value
    pub fn matches(&self, value: &Value) -> bool {
        self.matcher().matches(value)
    }

    /// Prepared form of the predicate for repeated evaluation
    pub(crate) fn matcher(&self) -> Matcher<'_> {
        match self {
            FilterPredicate::TextContains { text } => Matcher::Contains(text.to_lowercase()),
            FilterPredicate::InSet { values } => Matcher::OneOf(values),
            FilterPredicate::NumericRange { min, max } => Matcher::Between {
                min: min.min(*max),
                max: max.max(*min),
            },
            FilterPredicate::DateRange { start, end } => Matcher::Dates {
                start: *start,
                end: *end,
            },
        }
    }
}

/// Predicate prepared for evaluation over many records
#[derive(Debug)]
pub(crate) enum Matcher<'a> {
    /// Lower-cased needle
    Contains(String),
    OneOf(&'a IndexSet<String>),
    Between { min: f64, max: f64 },
    Dates { start: Option<NaiveDate>, end: Option<NaiveDate> },
}

impl Matcher<'_> {
    pub(crate) fn matches(&self, value: &Value) -> bool {
        match self {
            Matcher::Contains(needle) => value.to_text().to_lowercase().contains(needle.as_str()),
            Matcher::OneOf(values) => value
                .facet_key()
                .map(|key| values.contains(&*key))
                .unwrap_or(false),
            Matcher::Between { min, max } => value
                .as_number()
                .map(|n| n >= *min && n <= *max)
                .unwrap_or(false),
            Matcher::Dates { start, end } => {
                if start.is_none() && end.is_none() {
                    return true;
                }
                match value.as_date() {
                    Some(date) => {
                        start.map_or(true, |start| date >= start) && end.map_or(true, |end| date <= end)
                    }
                    None => false,
                }
            }
        }
    }
}

/// An active filter bound to one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub column: String,
    pub predicate: FilterPredicate,
}

impl FilterCriterion {
    pub fn new(column: impl Into<String>, predicate: FilterPredicate) -> Self {
        Self {
            column: column.into(),
            predicate,
        }
    }
}

/// The set of column filters, at most one per column
///
/// Cleared predicates are never stored; inserting one removes the column's
/// criterion instead. Columns keep the order their filter was first set in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    criteria: IndexMap<String, FilterPredicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the criterion for a column
    pub fn set(&mut self, criterion: FilterCriterion) {
        match criterion.predicate.normalize() {
            Some(predicate) => {
                self.criteria.insert(criterion.column, predicate);
            }
            None => {
                self.criteria.shift_remove(&criterion.column);
            }
        }
    }

    /// Remove the criterion for a column, returning whether one existed
    pub fn remove(&mut self, column: &str) -> bool {
        self.criteria.shift_remove(column).is_some()
    }

    pub fn clear(&mut self) {
        self.criteria.clear();
    }

    pub fn get(&self, column: &str) -> Option<&FilterPredicate> {
        self.criteria.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterPredicate)> {
        self.criteria.iter().map(|(column, predicate)| (column.as_str(), predicate))
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl FromIterator<FilterCriterion> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterCriterion>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for criterion in iter {
            set.set(criterion);
        }
        set
    }
}
