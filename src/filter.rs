//! Filtering a record store into a [`View`].
//!
//! A [`FilterState`] combines three independent predicates, all of which a
//! record must satisfy:
//!
//! - free-text search terms (see [`search`])
//! - an inclusive time range over `time` (see [`range`])
//! - an optional set of levels (see [`level`])
//!
//! Filtering always starts from the full store, never from a previous view.

pub mod level;
pub mod range;
pub mod search;

use crate::record::RecordStore;
use crate::view::View;
use std::collections::BTreeSet;
use std::sync::Arc;

pub use level::LevelFilter;
pub use range::{BoundSide, IgnoredBound, TimeRange};
pub use search::{split_terms, SearchQuery};

/// Current filter inputs of one tab
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Lowercase search terms, AND-combined
    pub terms: Vec<String>,
    /// Raw lower time bound as entered
    pub lower: Option<String>,
    /// Raw upper time bound as entered
    pub upper: Option<String>,
    /// Lowercase levels; empty means no level filter
    pub levels: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with only a search query set
    pub fn from_query(raw: &str) -> Self {
        let mut state = Self::default();
        state.set_search(raw);
        state
    }

    /// Replace the search terms from raw user input
    pub fn set_search(&mut self, raw: &str) {
        self.terms = split_terms(raw);
    }

    pub fn set_time_range(&mut self, lower: Option<&str>, upper: Option<&str>) {
        self.lower = lower.map(str::to_string);
        self.upper = upper.map(str::to_string);
    }

    pub fn set_levels<I, S>(&mut self, levels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.levels = LevelFilter::new(levels).levels().clone();
    }

    pub fn with_time_range(mut self, lower: Option<&str>, upper: Option<&str>) -> Self {
        self.set_time_range(lower, upper);
        self
    }

    pub fn with_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_levels(levels);
        self
    }

    /// True when no predicate could exclude anything
    pub fn is_empty(&self) -> bool {
        let blank = |bound: &Option<String>| bound.as_deref().map_or(true, |b| b.trim().is_empty());
        self.terms.is_empty() && blank(&self.lower) && blank(&self.upper) && self.levels.is_empty()
    }
}

/// Apply `filter` to the whole of `store`
///
/// The result keeps store order. Time bounds that fail to parse are dropped
/// and listed in [`View::ignored_bounds`].
pub fn apply_filter(store: &Arc<RecordStore>, filter: &FilterState) -> View {
    let (range, ignored) = TimeRange::parse(filter.lower.as_deref(), filter.upper.as_deref());
    let levels = LevelFilter::new(&filter.levels);
    let query = SearchQuery::new(&filter.terms);

    let indices: Vec<usize> = store
        .iter()
        .enumerate()
        .filter(|(_, record)| levels.matches(record) && range.contains(record) && query.matches(record))
        .map(|(index, _)| index)
        .collect();

    log::debug!(
        "Filter kept {} of {} records ({} terms, range active: {}, {} levels)",
        indices.len(),
        store.len(),
        filter.terms.len(),
        range.is_active(),
        levels.levels().len()
    );

    View::from_parts(Arc::clone(store), indices, ignored)
}
