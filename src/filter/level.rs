use crate::record::{Record, LEVEL_FIELD};
use std::collections::BTreeSet;

/// Keeps records whose `level` (lowercased) is in a fixed set
///
/// An empty set disables the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelFilter {
    levels: BTreeSet<String>,
}

impl LevelFilter {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let levels = levels
            .into_iter()
            .map(|level| level.as_ref().trim().to_lowercase())
            .filter(|level| !level.is_empty())
            .collect();
        Self { levels }
    }

    pub fn is_active(&self) -> bool {
        !self.levels.is_empty()
    }

    pub fn levels(&self) -> &BTreeSet<String> {
        &self.levels
    }

    pub fn matches(&self, record: &Record) -> bool {
        if self.levels.is_empty() {
            return true;
        }
        record
            .text(LEVEL_FIELD)
            .is_some_and(|level| self.levels.contains(&level.to_lowercase()))
    }
}
