//! Feature module - named, typed attributes to extract from product text

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value type expected for a feature
///
/// Types are inferred from the feature name and description. Inference is a
/// best-effort classifier: anything without a clear numeric or yes/no cue is `Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    /// Numeric measurement or quantity
    Number,

    /// Yes/no property
    Boolean,

    /// Free-form text
    Text,
}

/// Name prefixes that mark a yes/no feature
const BOOLEAN_PREFIXES: &[&str] = &[
    "is_", "has_", "can_", "supports_", "includes_", "contains_", "requires_",
];

/// Description phrases that mark a yes/no feature
const BOOLEAN_CUES: &[&str] = &["yes/no", "yes or no", "true/false", "whether", "boolean", "y/n"];

/// Unit tokens that mark a numeric feature when they end the name (`weight_kg`)
const NUMBER_UNITS: &[&str] = &[
    "kg", "g", "lb", "lbs", "oz", "mm", "cm", "km", "inch", "inches", "kw", "kwh", "wh",
    "mah", "hz", "khz", "mhz", "ghz", "ml", "rpm", "db", "pct", "percent", "mph", "kmh",
    "gb", "mb", "tb", "volts", "watts", "amps", "usd", "eur", "gbp",
];

/// Measure words that mark a numeric feature when they end the name (`max_power`)
const NUMBER_WORDS: &[&str] = &[
    "weight", "price", "cost", "count", "quantity", "width", "height", "length", "depth",
    "diameter", "capacity", "voltage", "wattage", "power", "speed", "temperature",
    "percentage", "amount",
];

/// Spelled-out units, recognised in a description after "in" (`in kilograms`)
const UNIT_WORDS: &[&str] = &[
    "kilograms", "grams", "pounds", "ounces", "millimeters", "millimetres", "centimeters",
    "centimetres", "meters", "metres", "litres", "liters", "watts", "volts", "hours",
    "minutes", "seconds", "percent", "dollars", "euros",
];

impl FeatureType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Number => "number",
            FeatureType::Boolean => "boolean",
            FeatureType::Text => "text",
        }
    }

    /// Infer a feature's type from its name and description
    ///
    /// A name is numeric when its last `_`-separated token is a unit or a measure
    /// word. A description is numeric only with an explicit cue such as
    /// "in kilograms", "numeric" or "number of".
    ///
    /// # Examples
    ///
    /// ```
    /// use featx_domain::FeatureType;
    ///
    /// assert_eq!(FeatureType::infer("weight_kg", ""), FeatureType::Number);
    /// assert_eq!(FeatureType::infer("is_waterproof", ""), FeatureType::Boolean);
    /// assert_eq!(FeatureType::infer("material", ""), FeatureType::Text);
    /// ```
    pub fn infer(name: &str, description: &str) -> Self {
        let name = name.to_lowercase();
        let description = description.to_lowercase();

        if BOOLEAN_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
            || BOOLEAN_CUES.iter().any(|cue| description.contains(cue))
        {
            return FeatureType::Boolean;
        }

        let numeric_name = name
            .rsplit(|c: char| !c.is_ascii_alphanumeric())
            .find(|token| !token.is_empty())
            .is_some_and(|last| NUMBER_UNITS.contains(&last) || NUMBER_WORDS.contains(&last));

        let words: Vec<&str> = description
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        let numeric_description = words.iter().any(|word| matches!(*word, "numeric" | "numerical"))
            || words.windows(2).any(|pair| match pair {
                ["in", unit] => NUMBER_UNITS.contains(unit) || UNIT_WORDS.contains(unit),
                ["number", "of"] | ["how", "many"] => true,
                _ => false,
            });

        if numeric_name || numeric_description {
            FeatureType::Number
        } else {
            FeatureType::Text
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single feature to extract
///
/// Created by parsing the feature list; immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    /// Unique feature name, used as the key in structured replies
    pub name: String,

    /// Human-readable description (may be empty)
    pub description: String,

    /// Type inferred from the name and description
    pub inferred_type: FeatureType,
}

impl FeatureDefinition {
    /// Create a definition, inferring its type
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let description = description.into();
        let inferred_type = FeatureType::infer(&name, &description);
        Self {
            name,
            description,
            inferred_type,
        }
    }

    /// Create a definition with an explicit type
    pub fn with_type(
        name: impl Into<String>,
        description: impl Into<String>,
        inferred_type: FeatureType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            inferred_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_boolean_from_prefix() {
        assert_eq!(FeatureType::infer("is_waterproof", ""), FeatureType::Boolean);
        assert_eq!(FeatureType::infer("Has_Bluetooth", ""), FeatureType::Boolean);
        assert_eq!(FeatureType::infer("supports_usb_c", ""), FeatureType::Boolean);
    }

    #[test]
    fn test_infer_boolean_from_description() {
        assert_eq!(
            FeatureType::infer("dishwasher_safe", "yes/no if it survives the dishwasher"),
            FeatureType::Boolean
        );
        assert_eq!(
            FeatureType::infer("foldable", "Whether the frame folds"),
            FeatureType::Boolean
        );
    }

    #[test]
    fn test_infer_number_from_units_and_words() {
        assert_eq!(FeatureType::infer("weight_kg", ""), FeatureType::Number);
        assert_eq!(FeatureType::infer("battery_mah", ""), FeatureType::Number);
        assert_eq!(FeatureType::infer("max_power", ""), FeatureType::Number);
        assert_eq!(
            FeatureType::infer("thickness", "panel thickness in millimeters"),
            FeatureType::Number
        );
    }

    #[test]
    fn test_infer_falls_back_to_text() {
        assert_eq!(FeatureType::infer("material", ""), FeatureType::Text);
        assert_eq!(FeatureType::infer("color", "primary colour"), FeatureType::Text);
        assert_eq!(FeatureType::infer("model_number", ""), FeatureType::Text);
    }

    #[test]
    fn test_measure_words_only_count_at_the_end_of_the_name() {
        assert_eq!(FeatureType::infer("power_source", ""), FeatureType::Text);
        assert_eq!(FeatureType::infer("speed_rating", ""), FeatureType::Text);
        assert_eq!(FeatureType::infer("weight_class", ""), FeatureType::Text);
        assert_eq!(FeatureType::infer("price_usd", ""), FeatureType::Number);
        assert_eq!(FeatureType::infer("weight", ""), FeatureType::Number);
    }

    #[test]
    fn test_description_needs_an_explicit_numeric_cue() {
        assert_eq!(
            FeatureType::infer("color", "main colour, e.g. count of colours no"),
            FeatureType::Text
        );
        assert_eq!(FeatureType::infer("finish", "surface finish, affects weight"), FeatureType::Text);
        assert_eq!(FeatureType::infer("capacity", "volume in litres"), FeatureType::Number);
        assert_eq!(FeatureType::infer("ports", "number of USB ports"), FeatureType::Number);
        assert_eq!(FeatureType::infer("rating", "numeric energy rating"), FeatureType::Number);
    }

    #[test]
    fn test_definition_new_infers_type() {
        let def = FeatureDefinition::new("is_waterproof", "");
        assert_eq!(def.inferred_type, FeatureType::Boolean);

        let def = FeatureDefinition::with_type("weight", "", FeatureType::Text);
        assert_eq!(def.inferred_type, FeatureType::Text);
    }

    #[test]
    fn test_type_display() {
        assert_eq!(FeatureType::Number.to_string(), "number");
        assert_eq!(FeatureType::Boolean.as_str(), "boolean");
    }
}
