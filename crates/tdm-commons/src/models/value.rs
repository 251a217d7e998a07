//! Scalar value stored in a dynamic table cell.
//!
//! Dynamic tables are populated from imported spreadsheets, so cells are
//! textual unless the store itself wrote them (timestamps, booleans, row
//! ids). Values serialize to plain JSON scalars; temporal values render to
//! the canonical `%Y-%m-%d %H:%M:%S` form so downstream consumers never
//! branch on a driver-native type.

use crate::constants::TIMESTAMP_FORMAT;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value the way it appears in query results: temporal values
    /// in the canonical format, everything else via Display. `None` for NULL.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Timestamp(ts) => Some(ts.format(TIMESTAMP_FORMAT).to_string()),
        }
    }

    /// Normalize to the form stored in result rows: timestamps become
    /// canonical text, other values pass through unchanged.
    pub fn canonicalize(self) -> Value {
        match self {
            Value::Timestamp(ts) => Value::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
            other => other,
        }
    }

    /// Parse a canonical timestamp string back into a temporal value.
    pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => {
                serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON scalar (null, bool, integer or string)")
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E>
    where
        E: de::Error,
    {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| E::custom("integer out of range"))
    }

    // Incoming strings stay textual; timestamps only originate inside the store.
    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Text(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::Text(v))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_canonical_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let value = Value::Timestamp(ts);
        assert_eq!(value.render().unwrap(), "2024-03-15 09:30:00");
        assert_eq!(
            value.canonicalize(),
            Value::Text("2024-03-15 09:30:00".to_string())
        );
    }

    #[test]
    fn test_parse_timestamp_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let rendered = Value::Timestamp(ts).render().unwrap();
        assert_eq!(Value::parse_timestamp(&rendered).unwrap(), ts);
        assert!(Value::parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_json_roundtrip_is_plain() {
        let json = serde_json::to_string(&Value::text("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Int(42)).unwrap(), "42");

        let back: Value = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(back, Value::text("alice"));
        let back: Value = serde_json::from_str("null").unwrap();
        assert_eq!(back, Value::Null);
    }
}
