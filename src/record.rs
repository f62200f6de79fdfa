//! Records and record stores.
//!
//! A [`Record`] is one parsed JSONL line: an ordered map from field name to an
//! arbitrary JSON value. A [`RecordStore`] is the full, time-ordered collection
//! of records behind one tab. Stores are never edited in place; every load or
//! merge builds a fresh one through [`RecordStoreBuilder`].

pub mod columns;

use crate::sort::{sort_indices, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

pub use columns::{columns, ColumnLayout, DEFAULT_VISIBLE_COLUMNS};

/// Field used for the initial ordering and for range filtering
pub const TIME_FIELD: &str = "time";
/// Field inspected by the level filter
pub const LEVEL_FIELD: &str = "level";
pub const MESSAGE_FIELD: &str = "message";

/// Separator between field texts in [`Record::search_text`]
///
/// Search terms come from whitespace splitting, so a term can never contain
/// this separator and therefore never matches across two fields.
const SEARCH_TEXT_SEPARATOR: char = ' ';

/// One parsed log line
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Convert a decoded JSON value; anything but an object is rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field names in their original line order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fields in their original line order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display text of a field, `None` when the field is absent
    pub fn text(&self, field: &str) -> Option<Cow<'_, str>> {
        self.0.get(field).map(value_text)
    }

    /// Lowercased text of every field value joined by a single space
    pub fn search_text(&self) -> String {
        let mut text = String::new();
        for (i, value) in self.0.values().enumerate() {
            if i > 0 {
                text.push(SEARCH_TEXT_SEPARATOR);
            }
            text.push_str(&value_text(value).to_lowercase());
        }
        text
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Text form of a JSON value as used for display, search and text sorting
///
/// Strings are returned verbatim. Numbers keep their JSON spelling, so `12.0`
/// and `12` stay distinct. Booleans and null use their JSON literals; arrays and
/// objects render as compact JSON.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// Ordered, immutable collection of records for one tab
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Arc<Record>>,
    columns: Vec<String>,
}

impl RecordStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records in input order
    ///
    /// Applies the initial ordering: ascending by `time`, records lacking a
    /// time first, ties kept in input order.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut builder = RecordStoreBuilder::new();
        builder.append_batch(records.into_iter().collect());
        builder.finish()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Record>> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().map(Arc::as_ref)
    }

    /// Column descriptor: `time`, `level`, `message` first when present, the
    /// remaining field names in lexical order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Accumulates parsed batches, then produces an ordered [`RecordStore`]
#[derive(Debug, Default)]
pub struct RecordStoreBuilder {
    records: Vec<Arc<Record>>,
}

impl RecordStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_batch(&mut self, batch: Vec<Record>) {
        self.records.reserve(batch.len());
        self.records.extend(batch.into_iter().map(Arc::new));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sort by time and derive the column descriptor
    pub fn finish(self) -> RecordStore {
        let order = sort_indices(&self.records, TIME_FIELD, SortDirection::Ascending);
        let mut slots: Vec<Option<Arc<Record>>> = self.records.into_iter().map(Some).collect();
        let records: Vec<Arc<Record>> = order
            .into_iter()
            .filter_map(|index| slots[index].take())
            .collect();
        let columns = columns(records.iter().map(Arc::as_ref));

        RecordStore { records, columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).expect("object")
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Record::from_value(json!([1, 2])).is_none());
        assert!(Record::from_value(json!("text")).is_none());
        assert!(Record::from_value(json!(null)).is_none());
        assert!(Record::from_value(json!({})).is_some());
    }

    #[test]
    fn test_value_text_pins_number_spelling() {
        assert_eq!(value_text(&json!(12)), "12");
        assert_eq!(value_text(&json!(12.0)), "12.0");
        assert_eq!(value_text(&json!(2.75)), "2.75");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!(null)), "null");
        assert_eq!(value_text(&json!("Device found")), "Device found");
        assert_eq!(value_text(&json!({"a": [1, "b"]})), r#"{"a":[1,"b"]}"#);
    }

    #[test]
    fn test_search_text_joins_fields_in_record_order() {
        let r = record(json!({"level": "ERROR", "code": 500, "ok": false}));
        assert_eq!(r.search_text(), "error 500 false");
    }

    #[test]
    fn test_field_order_is_preserved() {
        let r = record(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_store_orders_by_time_with_missing_first() {
        let store = RecordStore::from_records(vec![
            record(json!({"time": "2025-10-20T17:19:18Z", "n": 1})),
            record(json!({"n": 2})),
            record(json!({"time": "2025-10-20T17:19:16Z", "n": 3})),
            record(json!({"n": 4})),
        ]);

        let order: Vec<_> = store.iter().map(|r| r.text("n").unwrap()).collect();
        assert_eq!(order, vec!["2", "4", "3", "1"]);
    }

    #[test]
    fn test_store_derives_columns() {
        let store = RecordStore::from_records(vec![
            record(json!({"message": "m", "zone": "a", "time": "2025-10-20T17:19:16Z"})),
            record(json!({"level": "info", "alpha": 1})),
        ]);
        assert_eq!(
            store.columns(),
            &["time", "level", "message", "alpha", "zone"]
        );
    }

    #[test]
    fn test_builder_accumulates_batches() {
        let mut builder = RecordStoreBuilder::new();
        builder.append_batch(vec![record(json!({"time": "2025-01-02"}))]);
        builder.append_batch(vec![record(json!({"time": "2025-01-01"}))]);
        assert_eq!(builder.len(), 2);

        let store = builder.finish();
        assert_eq!(store.get(0).unwrap().text("time").unwrap(), "2025-01-01");
    }
}
