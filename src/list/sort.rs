//! Sort key coercion and stable ordering
//!
//! API data is not guaranteed to be clean, so every raw value is coerced to a
//! key of the column's type before comparison:
//! - numeric: leading number of the text, anything else 0
//! - date: milliseconds since the epoch, unparsable values at the epoch
//! - text: lowercase text, null as ""

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

use crate::models::{Coercion, FieldAccess, FieldValue, SortDirection};

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number pattern")
});

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// A coerced sort key
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Numeric key
    Number(f64),
    /// Milliseconds since the epoch
    Timestamp(i64),
    /// Lowercase text
    Text(String),
}

impl SortKey {
    /// Coerce a raw field value
    pub fn coerce(value: &FieldValue<'_>, coercion: Coercion) -> Self {
        match coercion {
            Coercion::Numeric => SortKey::Number(numeric(value)),
            Coercion::Date => SortKey::Timestamp(timestamp_millis(value)),
            Coercion::Text => SortKey::Text(
                value
                    .as_text()
                    .map(|text| text.to_lowercase())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Total order between keys of the same coercion.
    ///
    /// Keys of different kinds never meet inside one sort; they compare equal
    /// so the stable sort leaves them where they were.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

fn numeric(value: &FieldValue<'_>) -> f64 {
    let n = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(text) => parse_leading_number(text),
        FieldValue::Null | FieldValue::Bool(_) => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Parse the numeric prefix of `text` ("120k" → 120, "abc" → 0)
pub fn parse_leading_number(text: &str) -> f64 {
    LEADING_NUMBER
        .find(text.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn timestamp_millis(value: &FieldValue<'_>) -> i64 {
    match value {
        FieldValue::Number(n) if n.is_finite() => *n as i64,
        FieldValue::Text(text) => parse_timestamp(text).unwrap_or(0),
        _ => 0,
    }
}

/// Parse an API timestamp into epoch milliseconds
pub fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Stable sort of `records` by one field.
///
/// Keys are computed once per record. `slice::sort_by` is a stable merge
/// sort, and reversing the ordering (not the slice) for descending keeps
/// equal keys in their incoming order for both directions.
pub fn sort_stable<'r, R: FieldAccess>(
    records: Vec<&'r R>,
    field: &str,
    coercion: Coercion,
    direction: SortDirection,
) -> Vec<&'r R> {
    let mut keyed: Vec<(SortKey, &'r R)> = records
        .into_iter()
        .map(|record| (SortKey::coerce(&record.field(field), coercion), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| direction.apply(a.compare(b)));

    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use serde_json::Value;
    use std::borrow::Cow;

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().filter_map(|r| r.id()).collect()
    }

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("120"), 120.0);
        assert_eq!(parse_leading_number("  92.7 FM"), 92.7);
        assert_eq!(parse_leading_number("120k"), 120.0);
        assert_eq!(parse_leading_number("-3.5"), -3.5);
        assert_eq!(parse_leading_number("1e3 views"), 1000.0);
        assert_eq!(parse_leading_number("abc"), 0.0);
        assert_eq!(parse_leading_number(""), 0.0);
    }

    #[test]
    fn test_numeric_coercion_defaults_to_zero() {
        let key = |v: FieldValue<'_>| SortKey::coerce(&v, Coercion::Numeric);
        assert_eq!(key(FieldValue::Null), SortKey::Number(0.0));
        assert_eq!(key(FieldValue::Bool(true)), SortKey::Number(0.0));
        assert_eq!(key(FieldValue::Text(Cow::Borrowed("n/a"))), SortKey::Number(0.0));
        assert_eq!(key(FieldValue::Text(Cow::Borrowed("15"))), SortKey::Number(15.0));
        assert_eq!(key(FieldValue::Number(f64::NAN)), SortKey::Number(0.0));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z"), Some(1000));
        assert_eq!(parse_timestamp("1970-01-01T00:00:01.500+00:00"), Some(1500));
        assert_eq!(parse_timestamp("1970-01-02 00:00:00"), Some(86_400_000));
        assert_eq!(parse_timestamp("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_date_coercion_unparsable_is_epoch() {
        let key = |v: FieldValue<'_>| SortKey::coerce(&v, Coercion::Date);
        assert_eq!(key(FieldValue::Text(Cow::Borrowed("not a date"))), SortKey::Timestamp(0));
        assert_eq!(key(FieldValue::Null), SortKey::Timestamp(0));
        assert_eq!(key(FieldValue::Number(5000.0)), SortKey::Timestamp(5000));
    }

    #[test]
    fn test_text_coercion_lowercases_and_defaults_to_empty() {
        let key = |v: FieldValue<'_>| SortKey::coerce(&v, Coercion::Text);
        assert_eq!(key(FieldValue::Text(Cow::Borrowed("Radio"))), SortKey::Text("radio".into()));
        assert_eq!(key(FieldValue::Null), SortKey::Text(String::new()));
    }

    #[test]
    fn test_followers_desc_with_null() {
        let records = vec![
            Record::new().with("id", "a").with("followers_count", 5),
            Record::new().with("id", "b").with("followers_count", Value::Null),
            Record::new().with("id", "c").with("followers_count", 5),
            Record::new().with("id", "d").with("followers_count", 100),
        ];
        let sorted = sort_stable(
            records.iter().collect(),
            "followers_count",
            Coercion::Numeric,
            SortDirection::Desc,
        );
        assert_eq!(ids(&sorted), vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive_and_stable() {
        let records = vec![
            Record::new().with("id", "1").with("name", "beta"),
            Record::new().with("id", "2").with("name", "Alpha"),
            Record::new().with("id", "3").with("name", "BETA"),
            Record::new().with("id", "4"),
        ];
        let sorted = sort_stable(records.iter().collect(), "name", Coercion::Text, SortDirection::Asc);
        assert_eq!(ids(&sorted), vec!["4", "2", "1", "3"]);
    }

    #[test]
    fn test_date_sort_orders_mixed_formats() {
        let records = vec![
            Record::new().with("id", "new").with("created_at", "2024-05-01T10:00:00Z"),
            Record::new().with("id", "bad").with("created_at", "garbage"),
            Record::new().with("id", "old").with("created_at", "2023-01-01 08:30:00"),
        ];
        let sorted = sort_stable(records.iter().collect(), "created_at", Coercion::Date, SortDirection::Asc);
        assert_eq!(ids(&sorted), vec!["bad", "old", "new"]);
    }
}
