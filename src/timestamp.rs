//! Timestamp parsing shared by the range filter and the sorter.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;

/// A parsed point in time; comparisons are by instant regardless of offset
pub type Timestamp = DateTime<FixedOffset>;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse ISO-8601 text into a [`Timestamp`]
///
/// Accepts RFC 3339 (`2025-10-20T17:19:17Z`, `2025-10-20T19:19:17+02:00`),
/// naive date-times with `T` or space separator (taken as UTC) and bare dates
/// (midnight UTC). Surrounding whitespace is ignored.
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts);
    }

    let utc = FixedOffset::east_opt(0)?;
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| utc.from_utc_datetime(&naive))
}

/// Parse a JSON value as a timestamp; only strings qualify
pub fn value_timestamp(value: &Value) -> Option<Timestamp> {
    value.as_str().and_then(parse_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_variants() {
        let zulu = parse_timestamp("2025-10-20T17:19:17Z").unwrap();
        let offset = parse_timestamp("2025-10-20T19:19:17+02:00").unwrap();
        assert_eq!(zulu, offset);

        let fractional = parse_timestamp("2025-10-20T17:19:17.250Z").unwrap();
        assert!(fractional > zulu);
    }

    #[test]
    fn test_parse_naive_forms_as_utc() {
        let expected = parse_timestamp("2025-10-20T17:19:17Z").unwrap();
        assert_eq!(parse_timestamp("2025-10-20T17:19:17"), Some(expected));
        assert_eq!(parse_timestamp("2025-10-20 17:19:17"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-10-20"),
            parse_timestamp("2025-10-20T00:00:00Z")
        );
    }

    #[test]
    fn test_rejects_non_timestamps() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("12.5"), None);
        assert_eq!(value_timestamp(&Value::from(1_729_444_757)), None);
    }
}
