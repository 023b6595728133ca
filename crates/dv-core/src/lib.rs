//! Core table state model for the data viewer
//! 
//! This crate owns everything a grid needs to turn a static record set into
//! what is on screen: filter, sort, visibility, grouping and pagination state,
//! the pure transitions the view layer drives them with, and the engine that
//! derives rows and facet statistics from them.

pub mod column;
pub mod engine;
pub mod error;
pub mod facets;
pub mod filter;
pub mod sort;
pub mod state;
pub mod value;

// Re-export commonly used types
pub use column::{ColumnKind, ColumnSpec};
pub use engine::{GridRow, GridView, GroupKey, GroupSummary, TableStateEngine};
pub use error::EngineError;
pub use facets::{compute_facets, Bounds, ColumnFacet, FacetCount, Facets};
pub use filter::{parse_date, FilterCriterion, FilterPredicate, FilterSet};
pub use sort::{SortKey, SortState};
pub use state::{Pagination, TableState, VisibilityMap};
pub use value::{Record, Value};
