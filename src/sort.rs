//! Type-aware, stable sorting of records by one field.
//!
//! A column is compared temporally when its values are timestamps, numerically
//! when they are numbers, and as case-insensitive text otherwise. The mode is
//! decided once per sort by sampling the present values, which keeps the
//! comparison a total order even for messy columns.

use crate::record::{value_text, Record};
use crate::timestamp::{value_timestamp, Timestamp};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// Number of present values inspected to choose a comparison mode
pub const MODE_SAMPLE_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// Field and direction of an applied sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// The sort that a request on `field` produces after `current`
    ///
    /// Same field toggles the direction, a different field starts ascending.
    pub fn next(current: Option<&SortSpec>, field: &str) -> Self {
        match current {
            Some(spec) if spec.field == field => Self {
                field: spec.field.clone(),
                direction: spec.direction.toggled(),
            },
            _ => Self::ascending(field),
        }
    }
}

/// How values of a column are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    Temporal,
    Numeric,
    Text,
}

/// Pick the comparison mode from a sample of present values
///
/// Temporal if every sampled value is a timestamp, numeric if every sampled
/// value is a number, text otherwise. An empty sample compares as text.
pub fn detect_mode<'a>(values: impl IntoIterator<Item = &'a Value>) -> CompareMode {
    let mut all_temporal = true;
    let mut all_numeric = true;
    let mut sampled = 0usize;

    for value in values.into_iter().take(MODE_SAMPLE_SIZE) {
        sampled += 1;
        all_temporal = all_temporal && value_timestamp(value).is_some();
        all_numeric = all_numeric && value_number(value).is_some();
        if !all_temporal && !all_numeric {
            return CompareMode::Text;
        }
    }

    match (sampled, all_temporal, all_numeric) {
        (0, _, _) => CompareMode::Text,
        (_, true, _) => CompareMode::Temporal,
        (_, _, true) => CompareMode::Numeric,
        _ => CompareMode::Text,
    }
}

/// Numeric reading of a JSON value: numbers, or strings holding a number
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Precomputed comparison key for one record
///
/// Ordering: missing < present-but-unparsable (by lowercase text) < parsed.
#[derive(Debug, Clone)]
enum SortKey {
    Missing,
    Unparsed(String),
    Time(Timestamp),
    Number(f64),
    Text(String),
}

impl SortKey {
    fn build(value: Option<&Value>, mode: CompareMode) -> Self {
        let Some(value) = value else {
            return Self::Missing;
        };
        let parsed = match mode {
            CompareMode::Temporal => value_timestamp(value).map(Self::Time),
            CompareMode::Numeric => value_number(value).map(Self::Number),
            CompareMode::Text => Some(Self::Text(value_text(value).to_lowercase())),
        };
        parsed.unwrap_or_else(|| Self::Unparsed(value_text(value).to_lowercase()))
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Unparsed(_) => 1,
            Self::Time(_) => 2,
            Self::Number(_) => 3,
            Self::Text(_) => 4,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Unparsed(a), Self::Unparsed(b)) | (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Stable order of every record in `records` by `field`
pub fn sort_indices(
    records: &[Arc<Record>],
    field: &str,
    direction: SortDirection,
) -> Vec<usize> {
    let all: Vec<usize> = (0..records.len()).collect();
    sort_subset(records, &all, field, direction)
}

/// Stable reordering of `indices` (positions into `records`) by `field`
///
/// Indices past the end of `records` are dropped.
pub(crate) fn sort_subset(
    records: &[Arc<Record>],
    indices: &[usize],
    field: &str,
    direction: SortDirection,
) -> Vec<usize> {
    let present: Vec<(usize, &Record)> = indices
        .iter()
        .filter_map(|&i| records.get(i).map(|record| (i, record.as_ref())))
        .collect();
    let mode = detect_mode(present.iter().filter_map(|&(_, record)| record.get(field)));

    let mut keyed: Vec<(SortKey, usize)> = present
        .iter()
        .map(|&(i, record)| (SortKey::build(record.get(field), mode), i))
        .collect();

    match direction {
        SortDirection::Ascending => keyed.sort_by(|a, b| a.0.compare(&b.0)),
        SortDirection::Descending => keyed.sort_by(|a, b| b.0.compare(&a.0)),
    }

    keyed.into_iter().map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> Vec<Arc<Record>> {
        values
            .into_iter()
            .map(|v| Arc::new(Record::from_value(v).unwrap()))
            .collect()
    }

    #[test]
    fn test_detect_mode() {
        assert_eq!(
            detect_mode(&[json!("2025-10-20T17:19:16Z"), json!("2025-10-20")]),
            CompareMode::Temporal
        );
        assert_eq!(
            detect_mode(&[json!(10), json!("2.5"), json!(-1)]),
            CompareMode::Numeric
        );
        assert_eq!(
            detect_mode(&[json!(10), json!("abc")]),
            CompareMode::Text
        );
        assert_eq!(detect_mode(std::iter::empty::<&Value>()), CompareMode::Text);
    }

    #[test]
    fn test_numeric_sort_is_not_lexical() {
        let rs = records(vec![
            json!({"n": 10}),
            json!({"n": 9}),
            json!({"n": "100"}),
            json!({"n": 2.5}),
        ]);
        assert_eq!(
            sort_indices(&rs, "n", SortDirection::Ascending),
            vec![3, 1, 0, 2]
        );
    }

    #[test]
    fn test_temporal_sort_compares_instants() {
        let rs = records(vec![
            json!({"t": "2025-10-20T18:00:00+02:00"}),
            json!({"t": "2025-10-20T17:00:00Z"}),
        ]);
        // 18:00+02:00 is 16:00Z
        assert_eq!(sort_indices(&rs, "t", SortDirection::Ascending), vec![0, 1]);
    }

    #[test]
    fn test_text_sort_ignores_case() {
        let rs = records(vec![
            json!({"s": "beta"}),
            json!({"s": "Alpha"}),
            json!({"s": "gamma"}),
        ]);
        assert_eq!(
            sort_indices(&rs, "s", SortDirection::Ascending),
            vec![1, 0, 2]
        );
    }

    #[test]
    fn test_missing_values_sort_first_and_stable() {
        let rs = records(vec![
            json!({"n": 2}),
            json!({"other": "x"}),
            json!({"n": 1}),
            json!({"other": "y"}),
        ]);
        assert_eq!(
            sort_indices(&rs, "n", SortDirection::Ascending),
            vec![1, 3, 2, 0]
        );
        assert_eq!(
            sort_indices(&rs, "n", SortDirection::Descending),
            vec![0, 2, 1, 3]
        );
    }

    #[test]
    fn test_unparsable_values_sit_between_missing_and_parsed() {
        // the stray string lies beyond the sample, so the column stays numeric
        let mut values: Vec<Value> = (0..MODE_SAMPLE_SIZE).map(|i| json!({"n": i})).collect();
        values.push(json!({"n": "n/a"}));
        values.push(json!({}));
        let rs = records(values);

        assert_eq!(
            detect_mode(rs.iter().filter_map(|r| r.get("n"))),
            CompareMode::Numeric
        );

        let order = sort_indices(&rs, "n", SortDirection::Ascending);
        assert_eq!(&order[..3], &[MODE_SAMPLE_SIZE + 1, MODE_SAMPLE_SIZE, 0]);
        assert_eq!(order.last(), Some(&(MODE_SAMPLE_SIZE - 1)));
    }

    #[test]
    fn test_mixed_sample_falls_back_to_text() {
        let rs = records(vec![json!({"n": 10}), json!({"n": "n/a"}), json!({"n": 9})]);
        assert_eq!(
            detect_mode(rs.iter().filter_map(|r| r.get("n"))),
            CompareMode::Text
        );
        // lexical: "10" < "9" < "n/a"
        assert_eq!(sort_indices(&rs, "n", SortDirection::Ascending), vec![0, 2, 1]);
    }

    #[test]
    fn test_subset_sort_only_reorders_given_indices() {
        let rs = records(vec![
            json!({"n": 3}),
            json!({"n": 2}),
            json!({"n": 1}),
        ]);
        assert_eq!(
            sort_subset(&rs, &[0, 2], "n", SortDirection::Ascending),
            vec![2, 0]
        );
    }

    #[test]
    fn test_subset_sort_drops_stale_indices() {
        let rs = records(vec![json!({"n": 3}), json!({"n": 1})]);
        assert_eq!(
            sort_subset(&rs, &[0, 7, 1], "n", SortDirection::Ascending),
            vec![1, 0]
        );
    }

    #[test]
    fn test_sort_spec_toggling() {
        let first = SortSpec::next(None, "level");
        assert_eq!(first.direction, SortDirection::Ascending);

        let second = SortSpec::next(Some(&first), "level");
        assert_eq!(second.direction, SortDirection::Descending);

        let third = SortSpec::next(Some(&second), "level");
        assert_eq!(third, first);

        let other = SortSpec::next(Some(&second), "time");
        assert_eq!(other, SortSpec::ascending("time"));
    }
}
