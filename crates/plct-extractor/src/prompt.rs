//! Prompt construction for full-document extraction

use plct_domain::SchemaSpec;

/// Builds the single request sent for one document
pub struct PromptBuilder<'a> {
    schema: &'a SchemaSpec,
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for `text` against `schema`
    pub fn new(schema: &'a SchemaSpec, text: &'a str) -> Self {
        Self { schema, text }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let schema = self.schema.render();
        let mut prompt = String::with_capacity(
            EXTRACTION_INSTRUCTIONS.len() + schema.len() + self.text.len() + 256,
        );

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&schema);
        prompt.push('\n');

        prompt.push_str(SCORING_RUBRIC);
        prompt.push_str("\n\n");

        prompt.push_str("Annual report text:\n");
        prompt.push_str("---\n");
        prompt.push_str(self.text);
        prompt.push_str("\n---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = "You are analysing a company annual report for digital-transformation \
initiatives. Identify the company, the fiscal year the report covers and every distinct initiative. \
Score each initiative on the four PLCT dimensions and rate how specifically the report discloses it.";

const SCORING_RUBRIC: &str = r#"Scoring guidance (all scores 0-100):
- Dimension scores: 0-20 no impact, 21-40 minor, 41-60 moderate, 61-80 significant, 81-100 transformative
- Disclosure scores: 0 not mentioned, 25 vague mention, 50 general description, 75 specific detail, 100 quantified with figures or dates
- Only use values from the allowed lists for enumerated fields
- Do not invent initiatives that the report does not describe"#;

const OUTPUT_FORMAT_REMINDER: &str =
    "Respond with the JSON object only: no markdown fences and no commentary.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_schema_and_text() {
        let schema = SchemaSpec::plct();
        let prompt = PromptBuilder::new(&schema, "Acme Berhad launched a cloud migration.").build();

        assert!(prompt.contains("\"companyName\""));
        assert!(prompt.contains("\"operationalEfficiencyScore\""));
        assert!(prompt.contains("Acme Berhad launched a cloud migration."));
        assert!(prompt.ends_with(OUTPUT_FORMAT_REMINDER));
    }

    #[test]
    fn test_text_follows_schema() {
        let schema = SchemaSpec::plct();
        let prompt = PromptBuilder::new(&schema, "REPORT BODY").build();
        let schema_at = prompt.find("Return a single JSON object").unwrap();
        let text_at = prompt.find("REPORT BODY").unwrap();
        assert!(schema_at < text_at);
    }
}
