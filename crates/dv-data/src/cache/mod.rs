//! Facet caching layer

use std::sync::Arc;

use ahash::AHashMap;
use dv_core::{compute_facets, ColumnFacet, ColumnSpec, Facets, Record};
use parking_lot::RwLock;

/// Memoized facet statistics for one dataset
///
/// Facets depend only on the records and column kinds, so they are computed
/// once per column and shared by every clone of the cache. Callers must
/// `clear` the cache if the records change.
#[derive(Debug, Clone, Default)]
pub struct FacetCache {
    /// Cached facets indexed by column id
    facets: Arc<RwLock<AHashMap<String, ColumnFacet>>>,
}

impl FacetCache {
    /// Create a new, empty facet cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached facet
    pub fn get(&self, column: &str) -> Option<ColumnFacet> {
        self.facets.read().get(column).cloned()
    }

    /// Facets for the columns, computing only those not cached yet
    pub fn get_or_compute(&self, records: &[Record], columns: &[ColumnSpec]) -> Facets {
        let missing: Vec<ColumnSpec> = {
            let facets = self.facets.read();
            columns
                .iter()
                .filter(|column| !facets.contains_key(&column.id))
                .cloned()
                .collect()
        };

        if !missing.is_empty() {
            tracing::debug!("Computing facets for {} uncached columns", missing.len());
            let computed = compute_facets(records, &missing);
            self.facets.write().extend(computed);
        }

        let facets = self.facets.read();
        columns
            .iter()
            .filter_map(|column| {
                facets
                    .get(&column.id)
                    .map(|facet| (column.id.clone(), facet.clone()))
            })
            .collect()
    }

    /// Number of cached columns
    pub fn len(&self) -> usize {
        self.facets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.read().is_empty()
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.facets.write().clear();
    }
}
