//! Filtered and sorted projections of a record store.

pub mod paginator;

use crate::filter::IgnoredBound;
use crate::record::{Record, RecordStore};
use crate::sort::{sort_subset, SortSpec};
use std::sync::Arc;

pub use paginator::{Paginator, DEFAULT_PAGE_SIZE};

/// An ordered selection of records from a shared [`RecordStore`]
///
/// Views hold indices into the store and are cheap to clone. Sorting or
/// filtering yields a new view; the store is never touched.
#[derive(Debug, Clone)]
pub struct View {
    store: Arc<RecordStore>,
    indices: Vec<usize>,
    sort: Option<SortSpec>,
    ignored_bounds: Vec<IgnoredBound>,
}

impl View {
    /// Every record of `store` in store order
    pub fn unfiltered(store: Arc<RecordStore>) -> Self {
        let indices = (0..store.len()).collect();
        Self::from_parts(store, indices, Vec::new())
    }

    pub(crate) fn from_parts(
        store: Arc<RecordStore>,
        indices: Vec<usize>,
        ignored_bounds: Vec<IgnoredBound>,
    ) -> Self {
        Self {
            store,
            indices,
            sort: None,
            ignored_bounds,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn get(&self, position: usize) -> Option<&Arc<Record>> {
        self.indices
            .get(position)
            .and_then(|&index| self.store.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.indices
            .iter()
            .filter_map(|&index| self.store.get(index))
            .map(Arc::as_ref)
    }

    /// Sort applied to this view, if any
    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Time bounds dropped while filtering because they did not parse
    pub fn ignored_bounds(&self) -> &[IgnoredBound] {
        &self.ignored_bounds
    }

    /// Sort by `field`, toggling direction when this view is already sorted
    /// by it
    pub fn sort_by(&self, field: &str) -> View {
        self.sorted(SortSpec::next(self.sort.as_ref(), field))
    }

    /// Apply exactly `spec`
    pub fn sorted(&self, spec: SortSpec) -> View {
        let indices = sort_subset(self.store.records(), &self.indices, &spec.field, spec.direction);
        log::debug!(
            "Sorted {} records by {} {}",
            indices.len(),
            spec.field,
            spec.direction.name()
        );
        View {
            store: Arc::clone(&self.store),
            indices,
            sort: Some(spec),
            ignored_bounds: self.ignored_bounds.clone(),
        }
    }

    /// Records `[page * page_size, (page + 1) * page_size)`; empty past the end
    pub fn page(&self, page: usize, page_size: usize) -> Vec<Arc<Record>> {
        let start = page.saturating_mul(page_size).min(self.indices.len());
        let end = start.saturating_add(page_size).min(self.indices.len());
        self.indices[start..end]
            .iter()
            .filter_map(|&index| self.store.get(index).cloned())
            .collect()
    }
}
