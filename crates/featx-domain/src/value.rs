//! Typed feature values and the per-record value mapping

use crate::schema::FeatureSchema;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Marker the model is instructed to emit for features it cannot determine
pub const UNKNOWN_SENTINEL: &str = "UNKNOWN";

/// Other spellings of "no value" that models produce despite instructions
const NULL_SPELLINGS: &[&str] = &["unknown", "null", "none", "n/a", "not specified", "not available"];

/// Whether a raw string means "no value"
pub(crate) fn is_sentinel(raw: &str) -> bool {
    let normalized = raw.trim().to_lowercase();
    NULL_SPELLINGS.contains(&normalized.as_str())
}

/// A coerced feature value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Boolean value
    Boolean(bool),

    /// Numeric value (always finite)
    Number(f64),

    /// Text value (trimmed, never empty)
    Text(String),
}

impl FeatureValue {
    /// Convert to a JSON value
    pub fn to_json(&self) -> Value {
        match self {
            FeatureValue::Boolean(b) => Value::Bool(*b),
            FeatureValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FeatureValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Boolean(b) => write!(f, "{}", b),
            FeatureValue::Number(n) => write!(f, "{}", n),
            FeatureValue::Text(s) => f.write_str(s),
        }
    }
}

/// Values for one record, keyed by feature name in schema order
///
/// Always holds exactly the keys of the schema it was built from; features that
/// could not be resolved map to `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureValues {
    entries: Vec<(String, Option<FeatureValue>)>,
}

impl FeatureValues {
    /// All-null values for every feature in the schema
    pub fn unresolved(schema: &FeatureSchema) -> Self {
        Self {
            entries: schema
                .features()
                .iter()
                .map(|def| (def.name.clone(), None))
                .collect(),
        }
    }

    pub(crate) fn from_entries(entries: Vec<(String, Option<FeatureValue>)>) -> Self {
        Self { entries }
    }

    /// Look up a feature by exact name
    ///
    /// Returns `None` if the feature is not part of the schema and `Some(None)` if
    /// it is but was not resolved.
    pub fn get(&self, name: &str) -> Option<&Option<FeatureValue>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Iterate `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FeatureValue>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    /// Feature names in schema order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Number of features (resolved or not)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no features at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of features with a non-null value
    pub fn resolved_count(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_some()).count()
    }

    /// Whether every feature resolved to a value
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_some())
    }

    /// Convert to a raw JSON mapping (nulls included)
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(key, value)| {
                let json = value.as_ref().map(FeatureValue::to_json).unwrap_or(Value::Null);
                (key.clone(), json)
            })
            .collect()
    }
}

impl Serialize for FeatureValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_spellings() {
        assert!(is_sentinel(UNKNOWN_SENTINEL));
        assert!(is_sentinel("  unknown "));
        assert!(is_sentinel("N/A"));
        assert!(is_sentinel("null"));
        assert!(!is_sentinel("steel"));
        assert!(!is_sentinel("Na"));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FeatureValue::Number(5.0).to_string(), "5");
        assert_eq!(FeatureValue::Number(1.25).to_string(), "1.25");
        assert_eq!(FeatureValue::Boolean(true).to_string(), "true");
        assert_eq!(FeatureValue::Text("steel".into()).to_string(), "steel");
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(FeatureValue::Number(1.2).to_json(), serde_json::json!(1.2));
        assert_eq!(FeatureValue::Boolean(false).to_json(), serde_json::json!(false));
        assert_eq!(FeatureValue::Text("a".into()).to_json(), serde_json::json!("a"));
    }

    #[test]
    fn test_values_serialize_in_order_with_nulls() {
        let values = FeatureValues::from_entries(vec![
            ("weight_kg".into(), Some(FeatureValue::Number(1.2))),
            ("is_waterproof".into(), None),
            ("material".into(), Some(FeatureValue::Text("steel".into()))),
        ]);

        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"{"weight_kg":1.2,"is_waterproof":null,"material":"steel"}"#
        );
        assert_eq!(values.resolved_count(), 2);
        assert!(!values.is_complete());
        assert_eq!(values.get("is_waterproof"), Some(&None));
        assert_eq!(values.get("colour"), None);
    }
}
