//! Filter registrations
//!
//! Filters are declared once when a controller is built and receive their
//! current value on every read. An empty value disables a filter.

use serde::{Deserialize, Serialize};

use crate::models::FieldAccess;

/// What a filter compares against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FilterKind {
    /// Case-insensitive substring match on one field
    Text { field: String },
    /// Exact match on one field's textual form
    Select { field: String },
    /// Debounced free-text search: case-insensitive substring match on any
    /// of the listed fields
    Search { fields: Vec<String> },
}

/// A named filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Name used by `set_filter_value`
    pub name: String,
    /// Matching rule
    #[serde(flatten)]
    pub kind: FilterKind,
}

impl FilterSpec {
    /// Substring filter on `field`
    pub fn text(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FilterKind::Text { field: field.into() },
        }
    }

    /// Exact-match filter on `field`
    pub fn select(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FilterKind::Select { field: field.into() },
        }
    }

    /// Debounced search across `fields`
    pub fn search<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: FilterKind::Search {
                fields: fields.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Whether this is the debounced search filter
    pub fn is_search(&self) -> bool {
        matches!(self.kind, FilterKind::Search { .. })
    }

    /// Test a record against this filter's current value.
    ///
    /// Missing or null fields never match a non-empty value.
    pub fn matches<R: FieldAccess>(&self, record: &R, value: &str) -> bool {
        if value.is_empty() {
            return true;
        }

        match &self.kind {
            FilterKind::Text { field } => {
                let needle = value.to_lowercase();
                contains_folded(record, field, &needle)
            }
            FilterKind::Select { field } => record
                .field(field)
                .as_text()
                .is_some_and(|text| text == value),
            FilterKind::Search { fields } => {
                let needle = value.to_lowercase();
                fields.iter().any(|field| contains_folded(record, field, &needle))
            }
        }
    }
}

/// Case-insensitive containment; `needle` must already be lowercase
fn contains_folded<R: FieldAccess>(record: &R, field: &str, needle: &str) -> bool {
    record
        .field(field)
        .as_text()
        .is_some_and(|text| text.to_lowercase().contains(needle))
}

/// Apply every filter as a logical AND
pub(crate) fn matches_all<'a, R, I>(record: &R, active: I) -> bool
where
    R: FieldAccess,
    I: IntoIterator<Item = (&'a FilterSpec, &'a str)>,
{
    active
        .into_iter()
        .all(|(filter, value)| filter.matches(record, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use serde_json::Value;

    fn paparazzi() -> Record {
        Record::new()
            .with("page_name", "Dubai Streets")
            .with("username", "@streetcam")
            .with("category", "Travel")
            .with("location", Value::Null)
            .with("status", "approved")
            .with("group_id", 3)
    }

    #[test]
    fn test_empty_value_always_matches() {
        let record = Record::new();
        assert!(FilterSpec::text("location", "location").matches(&record, ""));
        assert!(FilterSpec::select("status", "status").matches(&record, ""));
        assert!(FilterSpec::search("search", ["page_name"]).matches(&record, ""));
    }

    #[test]
    fn test_text_filter_is_case_insensitive_substring() {
        let filter = FilterSpec::text("category", "category");
        assert!(filter.matches(&paparazzi(), "trav"));
        assert!(filter.matches(&paparazzi(), "TRAVEL"));
        assert!(!filter.matches(&paparazzi(), "food"));
    }

    #[test]
    fn test_null_or_missing_field_does_not_match() {
        assert!(!FilterSpec::text("location", "location").matches(&paparazzi(), "dubai"));
        assert!(!FilterSpec::text("region", "region").matches(&paparazzi(), "dubai"));
    }

    #[test]
    fn test_select_filter_is_exact() {
        let filter = FilterSpec::select("status", "status");
        assert!(filter.matches(&paparazzi(), "approved"));
        assert!(!filter.matches(&paparazzi(), "approve"));
        assert!(!filter.matches(&paparazzi(), "Approved"));
    }

    #[test]
    fn test_select_filter_matches_numbers_by_text() {
        let filter = FilterSpec::select("group", "group_id");
        assert!(filter.matches(&paparazzi(), "3"));
        assert!(!filter.matches(&paparazzi(), "30"));
    }

    #[test]
    fn test_search_matches_any_field() {
        let filter = FilterSpec::search("search", ["page_name", "username", "location"]);
        assert!(filter.matches(&paparazzi(), "streets"));
        assert!(filter.matches(&paparazzi(), "STREETCAM"));
        assert!(!filter.matches(&paparazzi(), "abu dhabi"));
    }

    #[test]
    fn test_matches_all_is_logical_and() {
        let status = FilterSpec::select("status", "status");
        let category = FilterSpec::text("category", "category");
        let record = paparazzi();

        assert!(matches_all(&record, [(&status, "approved"), (&category, "trav")]));
        assert!(!matches_all(&record, [(&status, "approved"), (&category, "food")]));
        assert!(matches_all(&record, []));
    }

    #[test]
    fn test_filter_spec_deserializes_from_yaml() {
        let spec: FilterSpec =
            serde_yaml::from_str("name: search\nkind: search\nfields: [sn, radio_name]\n").unwrap();
        assert_eq!(spec, FilterSpec::search("search", ["sn", "radio_name"]));
    }
}
