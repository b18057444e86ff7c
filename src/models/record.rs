//! Record model
//!
//! This module provides:
//! - `Record`, one API entity kept as an opaque field map
//! - `FieldValue`, the scalar view of a single field
//! - `FieldAccess`, the structural capability list controllers are generic over

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::list::ListError;

/// Scalar view of one record field.
///
/// Arrays and objects have no scalar meaning for filtering or sorting and
/// read as `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    /// Missing, null or non-scalar
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Textual value
    Text(Cow<'a, str>),
}

impl<'a> FieldValue<'a> {
    /// Whether the field is missing or null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Textual form used by text and select filters.
    ///
    /// Whole numbers render without a fractional part, so `3.0` reads as `"3"`.
    pub fn as_text(&self) -> Option<Cow<'a, str>> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            FieldValue::Number(n) => Some(Cow::Owned(format_number(*n))),
            FieldValue::Text(s) => Some(s.clone()),
        }
    }
}

impl<'a> From<&'a Value> for FieldValue<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
            Value::String(s) => FieldValue::Text(Cow::Borrowed(s.as_str())),
            Value::Null | Value::Array(_) | Value::Object(_) => FieldValue::Null,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Read access to named fields
///
/// List controllers only ever look at the fields their filters and sort
/// registrations name, so any entity that can answer `field` lookups can be
/// listed, whether it is a raw JSON record or a typed struct.
pub trait FieldAccess {
    /// Look up a field by name; unknown fields read as `FieldValue::Null`
    fn field(&self, name: &str) -> FieldValue<'_>;
}

impl FieldAccess for Map<String, Value> {
    fn field(&self, name: &str) -> FieldValue<'_> {
        self.get(name).map_or(FieldValue::Null, FieldValue::from)
    }
}

impl FieldAccess for Value {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match self {
            Value::Object(map) => map.field(name),
            _ => FieldValue::Null,
        }
    }
}

/// One API entity (a paparazzi page, a radio station, a theme, a press pack)
///
/// The shape is owned by the API; nothing here assumes specific fields
/// except `id`, which the mutation routes address records by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builder-style field insertion
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Raw JSON value of a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Identifier used in mutation routes, if the record carries one
    pub fn id(&self) -> Option<String> {
        self.field("id")
            .as_text()
            .map(Cow::into_owned)
            .filter(|id| !id.is_empty())
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert back into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Parse a JSON array of objects into records.
    ///
    /// The whole batch is rejected if the value is not an array or any
    /// element is not an object, so callers never replace a valid record set
    /// with a partially decoded one.
    pub fn list_from_json(value: Value) -> Result<Vec<Record>, ListError> {
        let Value::Array(items) = value else {
            return Err(ListError::NotAnArray(json_kind(&value)));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(Record(map)),
                other => Err(ListError::NotAnObject {
                    index,
                    kind: json_kind(&other),
                }),
            })
            .collect()
    }
}

impl FieldAccess for Record {
    fn field(&self, name: &str) -> FieldValue<'_> {
        self.0.field(name)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Short name of a JSON value's type for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_reads_scalars() {
        let record = Record::new()
            .with("name", "Radio One")
            .with("followers_count", 1200)
            .with("active", true)
            .with("remarks", Value::Null);

        assert_eq!(record.field("name"), FieldValue::Text(Cow::Borrowed("Radio One")));
        assert_eq!(record.field("followers_count"), FieldValue::Number(1200.0));
        assert_eq!(record.field("active"), FieldValue::Bool(true));
        assert!(record.field("remarks").is_null());
        assert!(record.field("missing").is_null());
    }

    #[test]
    fn test_nested_values_read_as_null() {
        let record = Record::new()
            .with("tags", json!(["a", "b"]))
            .with("owner", json!({"name": "x"}));

        assert!(record.field("tags").is_null());
        assert!(record.field("owner").is_null());
    }

    #[test]
    fn test_as_text_renders_whole_numbers_without_fraction() {
        assert_eq!(FieldValue::Number(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(FieldValue::Number(92.7).as_text().as_deref(), Some("92.7"));
        assert_eq!(FieldValue::Bool(false).as_text().as_deref(), Some("false"));
        assert_eq!(FieldValue::Null.as_text(), None);
    }

    #[test]
    fn test_id_accepts_numbers_and_strings() {
        assert_eq!(Record::new().with("id", 42).id(), Some("42".to_string()));
        assert_eq!(Record::new().with("id", "abc").id(), Some("abc".to_string()));
        assert_eq!(Record::new().with("id", "").id(), None);
        assert_eq!(Record::new().id(), None);
    }

    #[test]
    fn test_list_from_json_rejects_non_array() {
        let err = Record::list_from_json(json!({"paparazzi": []})).unwrap_err();
        assert!(matches!(err, ListError::NotAnArray("object")));
    }

    #[test]
    fn test_list_from_json_rejects_non_object_elements() {
        let err = Record::list_from_json(json!([{"id": 1}, 7])).unwrap_err();
        assert!(matches!(err, ListError::NotAnObject { index: 1, kind: "number" }));
    }

    #[test]
    fn test_list_from_json_keeps_order() {
        let records = Record::list_from_json(json!([{"id": 2}, {"id": 1}])).unwrap();
        let ids: Vec<_> = records.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_value_field_access() {
        let value = json!({"status": "approved"});
        assert_eq!(value.field("status").as_text().as_deref(), Some("approved"));
        assert!(json!([1, 2]).field("status").is_null());
    }
}
