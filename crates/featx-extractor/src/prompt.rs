//! LLM prompt engineering for feature extraction

use featx_domain::{FeatureSchema, FeatureType, UNKNOWN_SENTINEL};

/// Builds the extraction prompt for one product description
///
/// The output depends only on the schema and the text, so the same inputs always
/// render the same prompt.
pub struct PromptBuilder<'a> {
    schema: &'a FeatureSchema,
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(schema: &'a FeatureSchema, text: &'a str) -> Self {
        Self { schema, text }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Instruction
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Feature list, in schema order
        prompt.push_str("Features to extract:\n");
        for feature in self.schema.features() {
            prompt.push_str(&format!("- {} ({})", feature.name, feature.inferred_type));
            if !feature.description.is_empty() {
                prompt.push_str(&format!(": {}", feature.description));
            }
            prompt.push('\n');
        }
        prompt.push('\n');

        // 3. The text to analyze
        prompt.push_str("Product description:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        // 4. Rules and output format
        prompt.push_str(&format!(
            "Rules:\n- Use \"{}\" for any feature that is not stated or clearly implied; never guess\n",
            UNKNOWN_SENTINEL
        ));
        prompt.push_str(NORMALIZATION_RULES);
        prompt.push_str("\n\n");
        prompt.push_str(&format!("Return format: {}\n\n", self.example_object()));
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }

    /// One-line JSON shape with a type placeholder per feature
    fn example_object(&self) -> String {
        let fields: Vec<String> = self
            .schema
            .features()
            .iter()
            .map(|feature| {
                let placeholder = match feature.inferred_type {
                    FeatureType::Number => "<number>",
                    FeatureType::Boolean => "<true|false>",
                    FeatureType::Text => "\"<text>\"",
                };
                format!("\"{}\": {}", feature.name, placeholder)
            })
            .collect();
        format!("{{ {} }}", fields.join(", "))
    }
}

/// Render the prompt for `schema` and `raw_text`
pub fn build_prompt(schema: &FeatureSchema, raw_text: &str) -> String {
    PromptBuilder::new(schema, raw_text).build()
}

const EXTRACTION_INSTRUCTIONS: &str = "Extract the following features from this product description. \
Return ONLY a valid JSON object with the feature names as keys.";

const NORMALIZATION_RULES: &str = r#"- Extract only numbers without units (e.g. 5 instead of 5 mm, 26.3 instead of 26.3 kW)
- Normalize values (e.g. "5/3 mm" should be 1.67)
- For boolean features use true/false
- If a feature has a range (e.g. "5-10 kW"), extract the maximum value (10)
- Format percentage values as decimals (0.25 instead of 25%)"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Remember: Return ONLY valid JSON with exactly these keys, no markdown code blocks, no explanations.";
