//! Inclusive timestamp range filter over the `time` field.

use crate::record::{Record, TIME_FIELD};
use crate::timestamp::{parse_timestamp, value_timestamp, Timestamp};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    Lower,
    Upper,
}

/// A bound that could not be parsed and was treated as absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredBound {
    pub side: BoundSide,
    pub value: String,
}

impl fmt::Display for IgnoredBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            BoundSide::Lower => "lower",
            BoundSide::Upper => "upper",
        };
        write!(f, "ignored invalid {side} time bound {:?}", self.value)
    }
}

/// Parsed `[lower, upper]` range; either side may be open
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRange {
    lower: Option<Timestamp>,
    upper: Option<Timestamp>,
}

impl TimeRange {
    /// Parse both bounds once
    ///
    /// Blank bounds are simply absent. Unparsable bounds are absent too, and are
    /// returned so the caller can tell the user.
    pub fn parse(lower: Option<&str>, upper: Option<&str>) -> (Self, Vec<IgnoredBound>) {
        let mut ignored = Vec::new();
        let mut parse_side = |raw: Option<&str>, side: BoundSide| {
            let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                log::debug!("Ignoring unparsable {side:?} bound {raw:?}");
                ignored.push(IgnoredBound {
                    side,
                    value: raw.to_string(),
                });
            }
            parsed
        };

        let lower = parse_side(lower, BoundSide::Lower);
        let upper = parse_side(upper, BoundSide::Upper);
        (Self { lower, upper }, ignored)
    }

    pub fn is_active(&self) -> bool {
        self.lower.is_some() || self.upper.is_some()
    }

    /// Whether `record` falls inside the range
    ///
    /// With any bound active, records whose time is missing or unparsable are
    /// outside.
    pub fn contains(&self, record: &Record) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(time) = record.get(TIME_FIELD).and_then(value_timestamp) else {
            return false;
        };
        self.lower.map_or(true, |lower| time >= lower) && self.upper.map_or(true, |upper| time <= upper)
    }
}
