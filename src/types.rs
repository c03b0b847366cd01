//! Crate-level core types
//!
//! These types are shared across all activations and the storage layer.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

/// A JSON document stored in a TEXT column
///
/// Columns such as `pizzas.sizes`, `store_locations.hours` and
/// `order_items.toppings` hold JSON text. Reading one yields `Decoded` when
/// the text parses as `T`, and `Raw` with the untouched text otherwise.
/// Serialization mirrors that: the decoded value, or the raw string as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonColumn<T> {
    Decoded(T),
    Raw(String),
}

impl<T: DeserializeOwned> JsonColumn<T> {
    /// Decode column text, keeping the raw value when it is not valid `T`
    pub fn decode(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => JsonColumn::Decoded(value),
            Err(e) => {
                tracing::warn!(error = %e, "JSON column did not decode, keeping raw value");
                JsonColumn::Raw(raw)
            }
        }
    }
}

impl<T: Serialize> JsonColumn<T> {
    /// Encode a value for storage
    pub fn encode(value: &T) -> Result<String, serde_json::Error> {
        serde_json::to_string(value)
    }
}

impl<T> JsonColumn<T> {
    /// The decoded value, if the column held valid JSON of the expected shape
    pub fn decoded(&self) -> Option<&T> {
        match self {
            JsonColumn::Decoded(value) => Some(value),
            JsonColumn::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, JsonColumn::Raw(_))
    }
}

impl<T: Serialize> Serialize for JsonColumn<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonColumn::Decoded(value) => value.serialize(serializer),
            JsonColumn::Raw(raw) => serializer.serialize_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_decode_valid_json() {
        let column: JsonColumn<Vec<String>> = JsonColumn::decode(r#"["a","b"]"#.to_string());
        assert_eq!(
            column,
            JsonColumn::Decoded(vec!["a".to_string(), "b".to_string()])
        );
        assert!(!column.is_raw());
    }

    #[test]
    fn test_decode_failure_keeps_raw_value() {
        let column: JsonColumn<BTreeMap<String, String>> =
            JsonColumn::decode("mon 9-5".to_string());
        assert_eq!(column, JsonColumn::Raw("mon 9-5".to_string()));
        assert!(column.decoded().is_none());
    }

    #[test]
    fn test_shape_mismatch_is_raw() {
        // Valid JSON, wrong shape
        let column: JsonColumn<Vec<String>> = JsonColumn::decode(r#"{"a":1}"#.to_string());
        assert!(column.is_raw());
    }

    #[test]
    fn test_serialize_raw_as_string() {
        let column: JsonColumn<Vec<String>> = JsonColumn::Raw("not json".to_string());
        assert_eq!(serde_json::to_value(&column).unwrap(), "not json");

        let column = JsonColumn::Decoded(vec!["x".to_string()]);
        assert_eq!(
            serde_json::to_value(&column).unwrap(),
            serde_json::json!(["x"])
        );
    }

    #[test]
    fn test_encode() {
        let encoded = JsonColumn::encode(&vec!["t1".to_string()]).unwrap();
        assert_eq!(encoded, r#"["t1"]"#);
    }
}
