use std::collections::BTreeSet;
use std::sync::Arc;

use jlless::{apply_filter, columns, BatchParser, FilterState, Record, RecordStore, View};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const MALFORMED: [&str; 5] = ["not json", "{broken", "[1,2,3]", "42", "\"just text\""];
const WORDS: [&str; 8] = ["error", "auth", "timeout", "db", "cache", "ok", "retry", "user"];
const FIELD_NAMES: [&str; 8] = ["time", "level", "message", "url", "deviceID", "zeta", "alpha", "n"];

fn store_of(records: Vec<Record>) -> Arc<RecordStore> {
    Arc::new(RecordStore::from_records(records))
}

fn record_with_fields(names: &[&str]) -> Record {
    let mut fields = Map::new();
    for name in names {
        fields.insert((*name).to_string(), json!(1));
    }
    Record::new(fields)
}

fn expected_columns(records: &[Vec<&str>]) -> Vec<String> {
    let present: BTreeSet<&str> = records.iter().flatten().copied().collect();
    let mut ordered: Vec<String> = ["time", "level", "message"]
        .into_iter()
        .filter(|name| present.contains(name))
        .map(str::to_string)
        .collect();
    ordered.extend(
        present
            .iter()
            .filter(|name| !["time", "level", "message"].contains(*name))
            .map(|name| name.to_string()),
    );
    ordered
}

// =============================================================================
// Parsing
// =============================================================================

proptest! {
    #[test]
    fn valid_and_malformed_lines_are_counted(
        lines in prop::collection::vec((any::<bool>(), 0usize..MALFORMED.len()), 0..60)
    ) {
        let mut input = String::new();
        let mut valid = 0;
        let mut malformed = 0;
        for (i, (is_valid, bad)) in lines.iter().enumerate() {
            if *is_valid {
                input.push_str(&format!("{{\"i\":{}}}\n", i));
                valid += 1;
            } else {
                input.push_str(MALFORMED[*bad]);
                input.push('\n');
                malformed += 1;
            }
        }

        let parsed = BatchParser::new(7).parse(input.as_bytes(), None).unwrap();
        prop_assert_eq!(parsed.store.len(), valid);
        prop_assert_eq!(parsed.skipped, malformed);
    }
}

// =============================================================================
// Column model
// =============================================================================

proptest! {
    #[test]
    fn columns_lead_with_priority_fields(
        shape in prop::collection::vec(
            prop::sample::subsequence(FIELD_NAMES.to_vec(), 0..=FIELD_NAMES.len()),
            1..10,
        ),
        reverse in any::<bool>(),
    ) {
        let records: Vec<Record> = shape
            .iter()
            .map(|names| {
                let mut names = names.clone();
                if reverse {
                    names.reverse();
                }
                record_with_fields(&names)
            })
            .collect();

        prop_assert_eq!(columns(records.iter()), expected_columns(&shape));
    }
}

// =============================================================================
// Sorting
// =============================================================================

fn numbered(values: &[Option<i64>]) -> View {
    let records = values.iter().filter_map(|value| {
        let line = match value {
            Some(n) => json!({ "n": n }),
            None => json!({ "other": true }),
        };
        Record::from_value(line)
    });
    View::unfiltered(store_of(records.collect()))
}

fn keys(view: &View) -> Vec<Option<Value>> {
    view.iter().map(|r| r.get("n").cloned()).collect()
}

proptest! {
    #[test]
    fn repeated_sort_requests_toggle_direction(
        values in prop::collection::vec(prop::option::of(-50i64..50), 0..40)
    ) {
        let view = numbered(&values);
        let ascending = view.sort_by("n");
        let descending = ascending.sort_by("n");
        let again = descending.sort_by("n");

        let mut reversed = keys(&ascending);
        reversed.reverse();
        prop_assert_eq!(keys(&descending), reversed);
        prop_assert_eq!(keys(&again), keys(&ascending));
        prop_assert_eq!(again.sort_spec(), ascending.sort_spec());
    }
}

// =============================================================================
// Search
// =============================================================================

proptest! {
    #[test]
    fn extra_terms_only_narrow(
        messages in prop::collection::vec(
            prop::collection::vec(prop::sample::select(WORDS.to_vec()), 1..5),
            0..30,
        ),
        first in prop::sample::select(WORDS.to_vec()),
        second in prop::sample::select(WORDS.to_vec()),
    ) {
        let records = messages
            .iter()
            .filter_map(|words| Record::from_value(json!({ "message": words.join(" ") })))
            .collect();
        let store = store_of(records);

        let broad = apply_filter(&store, &FilterState::from_query(first));
        let narrow = apply_filter(&store, &FilterState::from_query(&format!("{} {}", first, second)));

        let broad: Vec<&Record> = broad.iter().collect();
        let narrow: Vec<&Record> = narrow.iter().collect();
        prop_assert!(narrow.len() <= broad.len());

        // narrow must be a subsequence of broad
        let mut rest = broad.iter();
        for record in &narrow {
            prop_assert!(rest.any(|candidate| std::ptr::eq(*candidate, *record)));
        }
    }
}
