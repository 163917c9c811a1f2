//! Feature schema - the run-wide set of features to extract
//!
//! A schema is parsed once from the feature list file and is read-only afterwards.
//! It drives both prompt construction and validation of structured replies:
//! coercion into typed values happens here and nowhere else in the pipeline.

use crate::error::SchemaError;
use crate::feature::{FeatureDefinition, FeatureType};
use crate::value::{is_sentinel, FeatureValue, FeatureValues};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Separator between a feature name and its optional description
pub const DESCRIPTION_SEPARATOR: char = ':';

/// Prefix marking a comment line in the feature list
pub const COMMENT_PREFIX: char = '#';

/// Ordered set of feature definitions keyed by unique name
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    features: Vec<FeatureDefinition>,
    // lowercase name -> position in `features`
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Parse a feature list
    ///
    /// Each non-empty line that does not start with `#` defines one feature, written
    /// as `name` or `name: description`.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::InvalidLine`] if a line has an empty name
    /// - [`SchemaError::Duplicate`] if two names match case-insensitively
    /// - [`SchemaError::Empty`] if no features are defined
    ///
    /// # Examples
    ///
    /// ```
    /// use featx_domain::{FeatureSchema, FeatureType};
    ///
    /// let schema = FeatureSchema::parse([
    ///     "# dimensions",
    ///     "weight_kg: net weight",
    ///     "",
    ///     "material",
    /// ]).unwrap();
    ///
    /// assert_eq!(schema.len(), 2);
    /// assert_eq!(schema.get("WEIGHT_KG").unwrap().inferred_type, FeatureType::Number);
    /// ```
    pub fn parse<I, S>(lines: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut definitions = Vec::new();

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }

            let (name, description) = match line.split_once(DESCRIPTION_SEPARATOR) {
                Some((name, description)) => (name.trim(), description.trim()),
                None => (line, ""),
            };

            if name.is_empty() {
                return Err(SchemaError::InvalidLine {
                    line: idx + 1,
                    reason: "feature name is empty".to_string(),
                });
            }

            definitions.push(FeatureDefinition::new(name, description));
        }

        Self::from_definitions(definitions)
    }

    /// Build a schema from already-constructed definitions
    pub fn from_definitions(definitions: Vec<FeatureDefinition>) -> Result<Self, SchemaError> {
        if definitions.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(definitions.len());
        for (pos, def) in definitions.iter().enumerate() {
            if index.insert(def.name.to_lowercase(), pos).is_some() {
                return Err(SchemaError::Duplicate(def.name.clone()));
            }
        }

        Ok(Self {
            features: definitions,
            index,
        })
    }

    /// Feature definitions in declaration order
    pub fn features(&self) -> &[FeatureDefinition] {
        &self.features
    }

    /// Look up a definition by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FeatureDefinition> {
        self.index
            .get(&name.to_lowercase())
            .map(|&pos| &self.features[pos])
    }

    /// Feature names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|def| def.name.as_str())
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Always false for a constructed schema; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Coerce a raw structured reply into typed values
    ///
    /// Every schema feature gets an entry. A value that is missing, null, the
    /// sentinel, or not coercible to the feature's type becomes `None` without
    /// affecting the other features. Keys that are not in the schema are dropped.
    pub fn validate(&self, raw: &Map<String, Value>) -> FeatureValues {
        let folded: HashMap<String, &Value> = raw
            .iter()
            .map(|(key, value)| (key.trim().to_lowercase(), value))
            .collect();

        let entries = self
            .features
            .iter()
            .map(|def| {
                let value = raw
                    .get(&def.name)
                    .or_else(|| folded.get(&def.name.to_lowercase()).copied())
                    .and_then(|value| coerce(def.inferred_type, value));
                (def.name.clone(), value)
            })
            .collect();

        FeatureValues::from_entries(entries)
    }
}

/// Coerce one raw value to the given type
fn coerce(kind: FeatureType, value: &Value) -> Option<FeatureValue> {
    if let Value::String(s) = value {
        if is_sentinel(s) {
            return None;
        }
    }

    match kind {
        FeatureType::Number => coerce_number(value).map(FeatureValue::Number),
        FeatureType::Boolean => coerce_boolean(value).map(FeatureValue::Boolean),
        FeatureType::Text => coerce_text(value).map(FeatureValue::Text),
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Parse a number, tolerating thousands separators and a trailing unit
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if let Ok(n) = cleaned.parse::<f64>() {
        return Some(n).filter(|n| n.is_finite());
    }

    let leading: String = cleaned
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        .collect();
    leading.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts = items
                .iter()
                .map(scalar_text)
                .collect::<Option<Vec<_>>>()?
                .into_iter()
                .filter(|part| !is_sentinel(part))
                .collect::<Vec<_>>();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let schema = FeatureSchema::parse([
            "# product features",
            "weight_kg",
            "   ",
            "is_waterproof: yes/no",
            "  # indented comment",
            "material : what it is made of",
        ])
        .unwrap();

        assert_eq!(schema.len(), 3);
        let names: Vec<_> = schema.names().collect();
        assert_eq!(names, vec!["weight_kg", "is_waterproof", "material"]);
        assert_eq!(schema.get("material").unwrap().description, "what it is made of");
    }

    #[test]
    fn test_parse_empty_list_fails() {
        assert_eq!(FeatureSchema::parse(Vec::<String>::new()), Err(SchemaError::Empty));
        assert_eq!(FeatureSchema::parse(["", "# only a comment"]), Err(SchemaError::Empty));
    }

    #[test]
    fn test_parse_duplicate_names_case_insensitive() {
        let result = FeatureSchema::parse(["Color", "weight_kg", "color"]);
        assert_eq!(result, Err(SchemaError::Duplicate("color".to_string())));
    }

    #[test]
    fn test_parse_empty_name_fails() {
        let result = FeatureSchema::parse(["weight_kg", ": no name here"]);
        assert!(matches!(result, Err(SchemaError::InvalidLine { line: 2, .. })));
    }

    #[test]
    fn test_validate_partial_scenario() {
        let schema = FeatureSchema::parse(["weight_kg", "is_waterproof", "material"]).unwrap();
        let raw = object(json!({
            "weight_kg": 1.2,
            "is_waterproof": "UNKNOWN",
            "material": "steel",
        }));

        let values = schema.validate(&raw);
        assert_eq!(values.get("weight_kg"), Some(&Some(FeatureValue::Number(1.2))));
        assert_eq!(values.get("is_waterproof"), Some(&None));
        assert_eq!(
            values.get("material"),
            Some(&Some(FeatureValue::Text("steel".to_string())))
        );
        assert!(!values.is_complete());
    }

    #[test]
    fn test_validate_drops_unknown_keys_and_fills_missing() {
        let schema = FeatureSchema::parse(["weight_kg", "material"]).unwrap();
        let raw = object(json!({"colour": "red", "weight_kg": "3"}));

        let values = schema.validate(&raw);
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("colour"), None);
        assert_eq!(values.get("weight_kg"), Some(&Some(FeatureValue::Number(3.0))));
        assert_eq!(values.get("material"), Some(&None));
    }

    #[test]
    fn test_validate_matches_keys_case_insensitively() {
        let schema = FeatureSchema::parse(["weight_kg"]).unwrap();
        let raw = object(json!({"Weight_KG": 2.5}));
        assert_eq!(
            schema.validate(&raw).get("weight_kg"),
            Some(&Some(FeatureValue::Number(2.5)))
        );
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(parse_number("1,250.5"), Some(1250.5));
        assert_eq!(parse_number(" 1.2 kg"), Some(1.2));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("heavy"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(coerce_boolean(&json!("Yes")), Some(true));
        assert_eq!(coerce_boolean(&json!("false")), Some(false));
        assert_eq!(coerce_boolean(&json!(1)), Some(true));
        assert_eq!(coerce_boolean(&json!(0)), Some(false));
        assert_eq!(coerce_boolean(&json!(2)), None);
        assert_eq!(coerce_boolean(&json!("maybe")), None);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(coerce_text(&json!("  steel ")), Some("steel".to_string()));
        assert_eq!(coerce_text(&json!("")), None);
        assert_eq!(coerce_text(&json!(42)), Some("42".to_string()));
        assert_eq!(coerce_text(&json!(["red", "blue"])), Some("red, blue".to_string()));
        assert_eq!(coerce_text(&json!({"nested": true})), None);
    }

    #[test]
    fn test_null_and_sentinel_yield_none() {
        assert_eq!(coerce(FeatureType::Text, &Value::Null), None);
        assert_eq!(coerce(FeatureType::Number, &json!("unknown")), None);
        assert_eq!(coerce(FeatureType::Boolean, &json!("N/A")), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn raw_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-1.0e9f64..1.0e9f64).prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9 .,-]{0,12}".prop_map(Value::String),
            Just(Value::String("UNKNOWN".to_string())),
        ]
    }

    proptest! {
        /// Property: one feature per non-empty, non-comment line, no duplicates
        #[test]
        fn test_parse_counts_definition_lines(
            names in prop::collection::hash_set("[a-z][a-z0-9_]{0,10}", 1..20),
            padding in 0..4usize,
        ) {
            let mut lines = Vec::new();
            for name in &names {
                for _ in 0..padding {
                    lines.push(String::new());
                }
                lines.push("# comment".to_string());
                lines.push(format!("{}: description of {}", name, name));
            }

            let schema = FeatureSchema::parse(&lines).unwrap();
            prop_assert_eq!(schema.len(), names.len());

            let mut seen = std::collections::HashSet::new();
            for name in schema.names() {
                prop_assert!(seen.insert(name.to_lowercase()));
            }
        }

        /// Property: validating already-validated values changes nothing
        #[test]
        fn test_validate_is_idempotent(
            weight in raw_value(),
            flag in raw_value(),
            material in raw_value(),
        ) {
            let schema = FeatureSchema::parse(["weight_kg", "is_waterproof", "material"]).unwrap();
            let mut raw = Map::new();
            raw.insert("weight_kg".to_string(), weight);
            raw.insert("is_waterproof".to_string(), flag);
            raw.insert("material".to_string(), material);

            let once = schema.validate(&raw);
            let twice = schema.validate(&once.to_json_map());
            prop_assert_eq!(once, twice);
        }
    }
}
