//! Extraction schema shared by the prompt builder and the validator
//!
//! [`SchemaSpec::plct`] is the single description of what the reasoning
//! engine must return. The extractor renders it into the request; the
//! validator reads the required-key lists from it.

use crate::scores::{SCORE_MAX, SCORE_MIN};
use crate::{InitiativeCategory, InnovationLevel, MaturityLevel, PlctDimension, Sector, StrategicPriority};

/// Key of the company name in engine output
pub const COMPANY_NAME: &str = "companyName";
/// Key of the report year in engine output
pub const REPORT_YEAR: &str = "reportYear";
/// Key of the sector in engine output
pub const SECTOR: &str = "sector";
/// Key of the maturity level in engine output
pub const MATURITY: &str = "digitalMaturityLevel";
/// Key of the strategic priority in engine output
pub const STRATEGIC_PRIORITY: &str = "strategicPriority";
/// Key of the initiative array in engine output
pub const INITIATIVES: &str = "initiatives";

/// Declared type of a schema field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Whole number
    Integer,
    /// Number in [0, 100]
    Score,
    /// One of a closed set of labels
    Enum(Vec<&'static str>),
    /// List of strings
    TextList,
    /// Small object of string values or list of strings
    Detail,
    /// Array of initiative objects
    InitiativeArray,
}

impl FieldKind {
    /// Human-readable type used in the rendered schema
    pub fn describe(&self) -> String {
        match self {
            FieldKind::Text => "string".to_string(),
            FieldKind::Integer => "integer".to_string(),
            FieldKind::Score => format!("number {}-{}", SCORE_MIN, SCORE_MAX),
            FieldKind::Enum(values) => {
                let quoted: Vec<String> = values.iter().map(|v| format!("\"{}\"", v)).collect();
                format!("one of {}", quoted.join(", "))
            }
            FieldKind::TextList => "array of strings".to_string(),
            FieldKind::Detail => "object of string values".to_string(),
            FieldKind::InitiativeArray => "array of initiative objects".to_string(),
        }
    }
}

/// One field of the schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// JSON key (lowerCamelCase)
    pub key: &'static str,
    /// Declared type
    pub kind: FieldKind,
    /// Whether absence rejects the owning record
    pub required: bool,
    /// Guidance for the engine
    pub description: &'static str,
}

impl FieldSpec {
    fn required(key: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            key,
            kind,
            required: true,
            description,
        }
    }

    fn optional(key: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            key,
            kind,
            required: false,
            description,
        }
    }
}

/// The shape the reasoning engine must return
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSpec {
    /// Top-level (company) fields
    pub company_fields: Vec<FieldSpec>,
    /// Fields of each element of `initiatives`
    pub initiative_fields: Vec<FieldSpec>,
}

impl SchemaSpec {
    /// The PLCT extraction schema
    pub fn plct() -> Self {
        let sectors: Vec<&'static str> = Sector::CLASSIFIED.iter().map(|s| s.as_str()).collect();

        let company_fields = vec![
            FieldSpec::required(COMPANY_NAME, FieldKind::Text, "Exact company name from the report"),
            FieldSpec::required(REPORT_YEAR, FieldKind::Integer, "Fiscal year the report covers"),
            FieldSpec::optional(SECTOR, FieldKind::Enum(sectors), "Primary industry sector"),
            FieldSpec::optional(
                MATURITY,
                FieldKind::Enum(MaturityLevel::labels()),
                "Overall digital maturity of the company",
            ),
            FieldSpec::optional(
                STRATEGIC_PRIORITY,
                FieldKind::Enum(StrategicPriority::labels()),
                "Priority the report gives digital transformation",
            ),
            FieldSpec::required(
                INITIATIVES,
                FieldKind::InitiativeArray,
                "Every distinct digital-transformation initiative in the report",
            ),
        ];

        let mut initiative_fields = vec![
            FieldSpec::required("description", FieldKind::Text, "Specific description of the initiative"),
            FieldSpec::optional(
                "category",
                FieldKind::Enum(InitiativeCategory::labels()),
                "Initiative category",
            ),
        ];
        for dimension in PlctDimension::ALL {
            initiative_fields.push(FieldSpec::required(
                dimension.wire_key(),
                FieldKind::Score,
                dimension_guidance(dimension),
            ));
        }
        initiative_fields.extend([
            FieldSpec::optional("investmentDisclosure", FieldKind::Score, "How specifically the investment is disclosed"),
            FieldSpec::optional("timelineDisclosure", FieldKind::Score, "How specifically the timeline is disclosed"),
            FieldSpec::optional("metricsDisclosure", FieldKind::Score, "How specifically success metrics and KPIs are disclosed"),
            FieldSpec::optional("technicalDisclosure", FieldKind::Score, "How specifically technologies and vendors are disclosed"),
            FieldSpec::optional("rationaleDisclosure", FieldKind::Score, "How clearly the business rationale is disclosed"),
            FieldSpec::optional("technologyUsed", FieldKind::TextList, "Technologies used"),
            FieldSpec::optional("department", FieldKind::TextList, "Departments involved"),
            FieldSpec::optional("timeline", FieldKind::Detail, "start, duration, end, phases"),
            FieldSpec::optional("successMetrics", FieldKind::Detail, "baseline, target, measurement, kpis"),
            FieldSpec::optional(
                "innovationLevel",
                FieldKind::Enum(InnovationLevel::labels()),
                "Degree of innovation",
            ),
            FieldSpec::optional("expectedImpact", FieldKind::Text, "Expected outcome or benefit"),
            FieldSpec::optional("investmentAmount", FieldKind::Text, "Investment amount or scale as stated"),
            FieldSpec::optional("businessRationale", FieldKind::Text, "Strategic reasoning and business case"),
            FieldSpec::optional("confidence", FieldKind::Text, "Your own confidence in this extraction"),
        ]);

        Self {
            company_fields,
            initiative_fields,
        }
    }

    /// Look up a top-level field
    pub fn company_field(&self, key: &str) -> Option<&FieldSpec> {
        self.company_fields.iter().find(|f| f.key == key)
    }

    /// Look up an initiative field
    pub fn initiative_field(&self, key: &str) -> Option<&FieldSpec> {
        self.initiative_fields.iter().find(|f| f.key == key)
    }

    /// Keys that must be present at the top level
    pub fn required_company_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.company_fields.iter().filter(|f| f.required).map(|f| f.key)
    }

    /// Keys that must be present on every initiative
    pub fn required_initiative_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.initiative_fields.iter().filter(|f| f.required).map(|f| f.key)
    }

    /// Render the schema as the field listing sent to the engine
    pub fn render(&self) -> String {
        let mut out = String::from("Return a single JSON object with these fields:\n");
        for field in &self.company_fields {
            out.push_str(&render_field(field, "- "));
            if field.kind == FieldKind::InitiativeArray {
                out.push_str("  Each initiative object has these fields:\n");
                for nested in &self.initiative_fields {
                    out.push_str(&render_field(nested, "  - "));
                }
            }
        }
        out
    }
}

fn render_field(field: &FieldSpec, indent: &str) -> String {
    let requirement = if field.required { "required" } else { "optional" };
    format!(
        "{}\"{}\" ({}, {}): {}\n",
        indent,
        field.key,
        field.kind.describe(),
        requirement,
        field.description
    )
}

fn dimension_guidance(dimension: PlctDimension) -> &'static str {
    match dimension {
        PlctDimension::CustomerExperience => {
            "Impact on customer experience: digital channels, personalization, service quality"
        }
        PlctDimension::PeopleEmpowerment => {
            "Impact on the workforce: digital skills, training, culture change"
        }
        PlctDimension::OperationalEfficiency => {
            "Impact on operations: automation, process optimization, cost reduction"
        }
        PlctDimension::NewBusinessModels => {
            "Impact on the business model: platforms, new revenue streams, ecosystems"
        }
    }
}
