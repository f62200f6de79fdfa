//! Multi-term, AND-combined free-text search across all fields.

use crate::record::Record;
use memchr::memmem::Finder;

/// Lowercase `raw` and split it on whitespace into search terms
///
/// Runs of whitespace collapse; blank input yields no terms.
pub fn split_terms(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Compiled search terms
///
/// A record matches when every term occurs in its [`Record::search_text`].
/// No terms matches everything.
pub struct SearchQuery {
    finders: Vec<Finder<'static>>,
}

impl SearchQuery {
    /// Compile already-split terms; terms are lowercased again defensively
    /// against callers that built them by hand
    pub fn new(terms: &[String]) -> Self {
        let finders = terms
            .iter()
            .filter(|term| !term.is_empty())
            .map(|term| Finder::new(term.to_lowercase().as_bytes()).into_owned())
            .collect();
        Self { finders }
    }

    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        if self.finders.is_empty() {
            return true;
        }
        let text = record.search_text();
        self.finders
            .iter()
            .all(|finder| finder.find(text.as_bytes()).is_some())
    }
}
