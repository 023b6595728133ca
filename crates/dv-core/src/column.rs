//! Column specifications

use serde::{Deserialize, Serialize};

/// Semantic kind of a column, which decides its filter widget and facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text, filtered by substring
    Text,
    /// Discrete values, filtered by multi-select
    Categorical,
    /// Numbers, filtered by a min/max slider
    NumericRange,
    /// Calendar dates, filtered by start/end pickers
    DateRange,
}

impl ColumnKind {
    /// Human readable name for the kind
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Categorical => "categorical",
            ColumnKind::NumericRange => "numeric range",
            ColumnKind::DateRange => "date range",
        }
    }
}

/// A column of the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Key into each record
    pub id: String,

    /// Display label; falls back to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    pub kind: ColumnKind,
}

impl ColumnSpec {
    /// Create a column spec
    pub fn new(id: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            id: id.into(),
            header: None,
            kind,
        }
    }

    pub fn text(id: impl Into<String>) -> Self {
        Self::new(id, ColumnKind::Text)
    }

    pub fn categorical(id: impl Into<String>) -> Self {
        Self::new(id, ColumnKind::Categorical)
    }

    pub fn numeric(id: impl Into<String>) -> Self {
        Self::new(id, ColumnKind::NumericRange)
    }

    pub fn date(id: impl Into<String>) -> Self {
        Self::new(id, ColumnKind::DateRange)
    }

    /// Set the display label
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Label shown in column headers and filter panels
    pub fn header(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.id)
    }
}
