//! Column model derived from the field names observed in a store.

use crate::record::{value_text, Record, LEVEL_FIELD, MESSAGE_FIELD, TIME_FIELD};
use std::collections::{BTreeSet, HashSet};

/// Fields that lead the column order, in this order, when present
const PRIORITY_COLUMNS: [&str; 3] = [TIME_FIELD, LEVEL_FIELD, MESSAGE_FIELD];

/// Columns shown when no configuration says otherwise
pub const DEFAULT_VISIBLE_COLUMNS: [&str; 4] = ["time", "level", "message", "url"];

/// Derive the ordered column descriptor from a full scan of `records`
///
/// `time`, `level` and `message` come first (each only if some record has it),
/// every other field follows in lexical order. Input field order is irrelevant.
pub fn columns<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<String> {
    let mut seen: BTreeSet<&'a str> = BTreeSet::new();
    for record in records {
        seen.extend(record.keys());
    }

    let mut ordered: Vec<String> = PRIORITY_COLUMNS
        .iter()
        .filter(|name| seen.remove(**name))
        .map(|name| (*name).to_string())
        .collect();
    ordered.extend(seen.into_iter().map(str::to_string));
    ordered
}

/// Visible/hidden partition of a column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    visible: Vec<String>,
    hidden: Vec<String>,
}

impl ColumnLayout {
    /// Split `all_columns` by the configured `visible_columns`
    ///
    /// Visible columns keep descriptor order. When none of the configured
    /// columns exist in the store, everything is visible.
    pub fn new(all_columns: &[String], visible_columns: &[String]) -> Self {
        let wanted: HashSet<&str> = visible_columns.iter().map(String::as_str).collect();
        let (visible, hidden): (Vec<String>, Vec<String>) = all_columns
            .iter()
            .cloned()
            .partition(|column| wanted.contains(column.as_str()));

        if visible.is_empty() {
            return Self {
                visible: hidden,
                hidden: Vec::new(),
            };
        }
        Self { visible, hidden }
    }

    pub fn visible(&self) -> &[String] {
        &self.visible
    }

    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    /// All fields of `record` as `(name, text)`: visible columns first, then
    /// hidden columns, then fields the layout has never seen
    pub fn record_details(&self, record: &Record) -> Vec<(String, String)> {
        let mut details = Vec::with_capacity(record.len());
        let mut listed: HashSet<&str> = HashSet::new();

        for column in self.visible.iter().chain(self.hidden.iter()) {
            if let Some(value) = record.get(column) {
                details.push((column.clone(), value_text(value).into_owned()));
                listed.insert(column.as_str());
            }
        }
        for (name, value) in record.fields() {
            if !listed.contains(name) {
                details.push((name.to_string(), value_text(value).into_owned()));
            }
        }
        details
    }
}
