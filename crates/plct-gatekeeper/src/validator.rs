//! Payload validation logic

use crate::fields::{self, Findings};
use crate::{GatekeeperError, ValidationConfig};
use plct_domain::schema::{COMPANY_NAME, INITIATIVES, MATURITY, REPORT_YEAR, SECTOR, STRATEGIC_PRIORITY};
use plct_domain::{
    CompanyProfile, DisclosureScores, InitiativeCategory, InnovationLevel, MaturityLevel, PlctDimension,
    PlctScores, RejectedInitiative, SchemaSpec, Sector, StrategicPriority, StructuredDetails,
    ValidatedInitiative, ValidatedPayload, Violation, ViolationKind,
};
use plct_extractor::RawPayload;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// The SchemaValidator checks engine output before it reaches the data model
pub struct SchemaValidator {
    config: ValidationConfig,
    schema: SchemaSpec,
}

impl SchemaValidator {
    /// Create a validator with the given configuration
    pub fn new(config: ValidationConfig) -> Result<Self, GatekeeperError> {
        config.validate().map_err(GatekeeperError::Config)?;
        Ok(Self {
            config,
            schema: SchemaSpec::plct(),
        })
    }

    /// Create a validator with default configuration
    pub fn default_config() -> Self {
        Self {
            config: ValidationConfig::default(),
            schema: SchemaSpec::plct(),
        }
    }

    /// Validation configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a whole payload
    ///
    /// Checks run in order: required top-level keys, numeric bounds, enum
    /// membership, nested shapes. Missing or invalid required top-level keys
    /// reject the payload and return every terminal violation found.
    /// Otherwise the payload is accepted; initiatives that fail their own
    /// required fields are moved to `rejected`. When the engine listed
    /// initiatives but none survived, the payload is rejected with their
    /// violations. An empty `initiatives` array is accepted.
    pub fn validate(&self, raw: &RawPayload) -> Result<ValidatedPayload, Vec<Violation>> {
        let obj = raw.as_object().ok_or_else(|| {
            vec![Violation::terminal("$", ViolationKind::InvalidType { expected: "object" })]
        })?;

        let mut findings = Findings::default();

        // (a) required top-level keys
        for key in self.schema.required_company_keys() {
            if matches!(obj.get(key), None | Some(Value::Null)) {
                findings.terminal(key, ViolationKind::Missing);
            }
        }
        let name = self.company_name(obj, &mut findings);
        let report_year = self.report_year(obj, &mut findings);
        let items = initiative_items(obj, &mut findings);

        if findings.has_terminal() {
            warn!(violations = findings.violations.len(), "Payload rejected");
            return Err(findings.violations);
        }
        let (Some(name), Some(report_year), Some(items)) = (name, report_year, items) else {
            return Err(findings.violations);
        };

        // (c) company enums
        let company = CompanyProfile {
            name,
            report_year,
            sector: fields::enum_field(SECTOR, obj.get(SECTOR), Sector::parse, Sector::Unclassified, &mut findings),
            maturity: fields::enum_field(
                MATURITY,
                obj.get(MATURITY),
                MaturityLevel::parse,
                MaturityLevel::Unclassified,
                &mut findings,
            ),
            strategic_priority: fields::enum_field(
                STRATEGIC_PRIORITY,
                obj.get(STRATEGIC_PRIORITY),
                StrategicPriority::parse,
                StrategicPriority::Unclassified,
                &mut findings,
            ),
        };

        let mut initiatives = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();
        let mut violations = findings.violations;

        for (index, item) in items.iter().enumerate() {
            match self.validate_initiative(index, item) {
                Ok((initiative, found)) => {
                    violations.extend(found);
                    initiatives.push(initiative);
                }
                Err(found) => {
                    warn!(
                        index,
                        reasons = %join_terminal(&found),
                        "Initiative rejected"
                    );
                    rejected.push(RejectedInitiative {
                        index,
                        description: item
                            .get("description")
                            .and_then(Value::as_str)
                            .map(|s| s.trim().to_string()),
                        violations: found,
                    });
                }
            }
        }

        // Nothing usable left: the record goes back to the caller like a
        // missing top-level key, so a later engine call can retry it
        if initiatives.is_empty() && !rejected.is_empty() {
            warn!(rejected = rejected.len(), "Every initiative rejected");
            return Err(rejected.into_iter().flat_map(|r| r.violations).collect());
        }

        info!(
            company = %company.name,
            year = company.report_year,
            accepted = initiatives.len(),
            rejected = rejected.len(),
            violations = violations.len(),
            "Payload validated"
        );

        Ok(ValidatedPayload {
            company,
            initiatives,
            rejected,
            violations,
        })
    }

    /// Validate one element of the `initiatives` array
    ///
    /// On success returns the initiative with its non-terminal violations.
    /// A missing description or any missing PLCT dimension rejects it.
    pub fn validate_initiative(
        &self,
        index: usize,
        value: &Value,
    ) -> Result<(ValidatedInitiative, Vec<Violation>), Vec<Violation>> {
        let path = |key: &str| format!("{}[{}].{}", INITIATIVES, index, key);
        let mut findings = Findings::default();

        let Some(obj) = value.as_object() else {
            findings.terminal(
                &format!("{}[{}]", INITIATIVES, index),
                ViolationKind::InvalidType { expected: "object" },
            );
            return Err(findings.violations);
        };

        // (a) required fields
        let description = self.description(&path("description"), obj.get("description"), &mut findings);

        // (b) numeric bounds
        let coerce = self.config.coerce_numeric_strings;
        let mut dimensions = [0.0; 4];
        for (slot, dimension) in dimensions.iter_mut().zip(PlctDimension::ALL) {
            let key = dimension.wire_key();
            if let Some(score) = fields::required_score(&path(key), obj.get(key), coerce, &mut findings) {
                *slot = score;
            }
        }
        if findings.has_terminal() {
            return Err(findings.violations);
        }

        let mut disclosure = |key: &str| fields::optional_score(&path(key), obj.get(key), coerce, &mut findings);
        let disclosure = DisclosureScores {
            investment: disclosure("investmentDisclosure"),
            timeline: disclosure("timelineDisclosure"),
            metrics: disclosure("metricsDisclosure"),
            technical: disclosure("technicalDisclosure"),
            rationale: disclosure("rationaleDisclosure"),
        };

        // (c) enums
        let category = fields::enum_field(
            &path("category"),
            obj.get("category"),
            InitiativeCategory::parse,
            InitiativeCategory::Unclassified,
            &mut findings,
        );
        let innovation_level = fields::enum_field(
            &path("innovationLevel"),
            obj.get("innovationLevel"),
            InnovationLevel::parse,
            InnovationLevel::Unclassified,
            &mut findings,
        );

        // (d) nested shapes
        let details = StructuredDetails {
            technology_used: fields::text_list(&path("technologyUsed"), obj.get("technologyUsed"), &mut findings),
            department: fields::text_list(&path("department"), obj.get("department"), &mut findings),
            timeline: fields::detail(&path("timeline"), obj.get("timeline"), &mut findings),
            success_metrics: fields::detail(&path("successMetrics"), obj.get("successMetrics"), &mut findings),
        };

        let initiative = ValidatedInitiative {
            description: description.unwrap_or_default(),
            category,
            dimensions: PlctScores::new(dimensions[0], dimensions[1], dimensions[2], dimensions[3]),
            disclosure,
            details,
            innovation_level,
            expected_impact: fields::text(&path("expectedImpact"), obj.get("expectedImpact"), &mut findings),
            investment_amount: fields::text(&path("investmentAmount"), obj.get("investmentAmount"), &mut findings),
            business_rationale: fields::text(
                &path("businessRationale"),
                obj.get("businessRationale"),
                &mut findings,
            ),
            reported_confidence: fields::text(&path("confidence"), obj.get("confidence"), &mut findings),
        };
        Ok((initiative, findings.violations))
    }

    fn company_name(&self, obj: &Map<String, Value>, findings: &mut Findings) -> Option<String> {
        match obj.get(COMPANY_NAME)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::String(_) => {
                findings.terminal(COMPANY_NAME, ViolationKind::Missing);
                None
            }
            Value::Null => None,
            _ => {
                findings.terminal(COMPANY_NAME, ViolationKind::InvalidType { expected: "string" });
                None
            }
        }
    }

    fn report_year(&self, obj: &Map<String, Value>, findings: &mut Findings) -> Option<u16> {
        let value = obj.get(REPORT_YEAR)?;
        if value.is_null() {
            return None;
        }
        let year = fields::number(value, self.config.coerce_numeric_strings)
            .filter(|n| n.fract() == 0.0)
            .map(|n| n as i64);
        match year {
            Some(year) if self.config.accepts_year(year) => u16::try_from(year).ok(),
            Some(_) => {
                findings.terminal(
                    REPORT_YEAR,
                    ViolationKind::InvalidType {
                        expected: "a year within the configured bounds",
                    },
                );
                None
            }
            None => {
                findings.terminal(REPORT_YEAR, ViolationKind::InvalidType { expected: "integer year" });
                None
            }
        }
    }

    fn description(&self, path: &str, value: Option<&Value>, findings: &mut Findings) -> Option<String> {
        match value {
            None | Some(Value::Null) => {
                findings.terminal(path, ViolationKind::Missing);
                None
            }
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.chars().count() < self.config.min_description_chars {
                    findings.terminal(path, ViolationKind::Missing);
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Some(_) => {
                findings.terminal(path, ViolationKind::InvalidType { expected: "string" });
                None
            }
        }
    }
}

/// The `initiatives` value as a list; a single object counts as one element
fn initiative_items(obj: &Map<String, Value>, findings: &mut Findings) -> Option<Vec<Value>> {
    match obj.get(INITIATIVES)? {
        Value::Array(items) => Some(items.clone()),
        single @ Value::Object(_) => Some(vec![single.clone()]),
        Value::Null => None,
        _ => {
            findings.terminal(
                INITIATIVES,
                ViolationKind::InvalidType {
                    expected: "array of initiative objects",
                },
            );
            None
        }
    }
}

fn join_terminal(violations: &[Violation]) -> String {
    violations
        .iter()
        .filter(|v| v.terminal)
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn initiative() -> Value {
        json!({
            "description": "Deployed RPA bots across finance shared services",
            "category": "Process Automation",
            "customerExperienceScore": 35,
            "peopleEmpowermentScore": 40,
            "operationalEfficiencyScore": 85,
            "newBusinessModelsScore": 20,
            "investmentDisclosure": 70,
            "timelineDisclosure": 60,
            "metricsDisclosure": 80,
            "technicalDisclosure": 75,
            "rationaleDisclosure": 65,
            "technologyUsed": ["UiPath", "SAP"],
            "department": ["Finance"],
            "timeline": {"start": "2022", "end": "2023"},
            "successMetrics": {"target": "40% faster close"},
            "innovationLevel": "Moderate",
            "expectedImpact": "Lower processing cost",
            "confidence": "High"
        })
    }

    fn payload(initiatives: Value) -> RawPayload {
        RawPayload::new(json!({
            "companyName": "  Acme Berhad ",
            "reportYear": 2023,
            "sector": "Banking",
            "digitalMaturityLevel": "Advanced",
            "strategicPriority": "High",
            "initiatives": initiatives
        }))
    }

    #[test]
    fn test_valid_payload() {
        let validator = SchemaValidator::default_config();
        let result = validator.validate(&payload(json!([initiative()]))).unwrap();

        assert_eq!(result.company.name, "Acme Berhad");
        assert_eq!(result.company.report_year, 2023);
        assert_eq!(result.company.sector, Sector::FinancialServices);
        assert_eq!(result.company.maturity, MaturityLevel::Advanced);
        assert_eq!(result.initiatives.len(), 1);
        assert!(result.rejected.is_empty());
        assert!(result.violations.is_empty(), "{:?}", result.violations);

        let first = &result.initiatives[0];
        assert_eq!(first.category, InitiativeCategory::ProcessAutomation);
        assert_eq!(first.dimensions.operational_efficiency, 85.0);
        assert_eq!(first.details.technology_used, vec!["UiPath", "SAP"]);
        assert_eq!(first.reported_confidence.as_deref(), Some("High"));
    }

    #[test]
    fn test_missing_top_level_keys_rejects_payload() {
        let validator = SchemaValidator::default_config();
        let raw = RawPayload::new(json!({"sector": "Technology"}));

        let violations = validator.validate(&raw).unwrap_err();
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&COMPANY_NAME));
        assert!(fields.contains(&REPORT_YEAR));
        assert!(fields.contains(&INITIATIVES));
        assert!(violations.iter().all(|v| v.terminal));
    }

    #[test]
    fn test_non_object_payload_rejected() {
        let validator = SchemaValidator::default_config();
        assert!(validator.validate(&RawPayload::new(json!([1, 2]))).is_err());
    }

    #[test]
    fn test_year_bounds_and_coercion() {
        let validator = SchemaValidator::default_config();
        let mut raw = payload(json!([])).into_value();

        raw["reportYear"] = json!("2022");
        assert_eq!(
            validator.validate(&RawPayload::new(raw.clone())).unwrap().company.report_year,
            2022
        );

        raw["reportYear"] = json!(1850);
        assert!(validator.validate(&RawPayload::new(raw.clone())).is_err());

        raw["reportYear"] = json!(2023.5);
        assert!(validator.validate(&RawPayload::new(raw)).is_err());
    }

    #[test]
    fn test_missing_operational_efficiency_is_terminal() {
        let validator = SchemaValidator::default_config();
        let mut item = initiative();
        item.as_object_mut().unwrap().remove("operationalEfficiencyScore");

        let violations = validator.validate_initiative(0, &item).unwrap_err();
        assert!(!violations.is_empty());
        let violation = violations
            .iter()
            .find(|v| v.field == "initiatives[0].operationalEfficiencyScore")
            .unwrap();
        assert!(violation.terminal);
        assert_eq!(violation.kind, ViolationKind::Missing);

        // Next to a valid initiative the payload survives without it
        let result = validator.validate(&payload(json!([item.clone(), initiative()]))).unwrap();
        assert_eq!(result.initiatives.len(), 1);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].index, 0);
        assert!(result.all_violations().any(|v| v.terminal));
    }

    #[test]
    fn test_all_initiatives_rejected_rejects_payload() {
        let validator = SchemaValidator::default_config();
        let mut item = initiative();
        item.as_object_mut().unwrap().remove("operationalEfficiencyScore");

        let violations = validator.validate(&payload(json!([item]))).unwrap_err();
        assert!(!violations.is_empty());
        assert!(violations
            .iter()
            .any(|v| v.terminal && v.field == "initiatives[0].operationalEfficiencyScore"));

        // An empty list is a company without initiatives, not a rejection
        let result = validator.validate(&payload(json!([]))).unwrap();
        assert!(result.initiatives.is_empty());
        assert!(result.rejected.is_empty());
    }

    #[test]
    fn test_null_dimension_is_terminal() {
        let validator = SchemaValidator::default_config();
        let mut item = initiative();
        item["newBusinessModelsScore"] = Value::Null;
        assert!(validator.validate_initiative(3, &item).is_err());
    }

    #[test]
    fn test_missing_description_rejects_initiative() {
        let validator = SchemaValidator::default_config();
        let mut item = initiative();
        item["description"] = json!("   ");
        assert!(validator.validate_initiative(0, &item).is_err());
    }

    #[test]
    fn test_clamping_keeps_initiative() {
        let validator = SchemaValidator::default_config();
        let mut item = initiative();
        item["customerExperienceScore"] = json!(105);

        let (validated, violations) = validator.validate_initiative(0, &item).unwrap();
        assert_eq!(validated.dimensions.customer_experience, 100.0);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].kind,
            ViolationKind::OutOfRange {
                value: 105.0,
                clamped_to: 100.0
            }
        );
    }

    #[test]
    fn test_unknown_enums_fall_back() {
        let validator = SchemaValidator::default_config();
        let mut raw = payload(json!([])).into_value();
        raw["sector"] = json!("Space Mining");

        let result = validator.validate(&RawPayload::new(raw)).unwrap();
        assert_eq!(result.company.sector, Sector::Unclassified);
        assert!(matches!(
            &result.violations[0].kind,
            ViolationKind::UnknownEnumValue { value } if value == "Space Mining"
        ));

        let mut item = initiative();
        item["category"] = json!("Quantum");
        let (validated, violations) = validator.validate_initiative(0, &item).unwrap();
        assert_eq!(validated.category, InitiativeCategory::Unclassified);
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_missing_disclosure_defaults_to_zero() {
        let validator = SchemaValidator::default_config();
        let mut item = initiative();
        item.as_object_mut().unwrap().remove("metricsDisclosure");

        let (validated, violations) = validator.validate_initiative(0, &item).unwrap();
        assert_eq!(validated.disclosure.metrics, 0.0);
        assert_eq!(violations.len(), 1);
        assert!(!violations[0].terminal);
    }

    #[test]
    fn test_single_object_counts_as_array() {
        let validator = SchemaValidator::default_config();
        let result = validator.validate(&payload(initiative())).unwrap();
        assert_eq!(result.initiatives.len(), 1);
    }

    #[test]
    fn test_malformed_nested_field_degrades() {
        let validator = SchemaValidator::default_config();
        let mut item = initiative();
        item["timeline"] = json!("{\"start\": 2022");

        let (validated, violations) = validator.validate_initiative(0, &item).unwrap();
        assert!(validated.details.timeline.is_empty());
        assert_eq!(validated.details.technology_used.len(), 2);
        assert!(matches!(violations[0].kind, ViolationKind::MalformedNested { .. }));
    }

    #[test]
    fn test_strict_rejects_numeric_strings() {
        let validator = SchemaValidator::new(ValidationConfig::strict()).unwrap();
        let mut item = initiative();
        item["peopleEmpowermentScore"] = json!("40");
        assert!(validator.validate_initiative(0, &item).is_err());
    }

    proptest! {
        #[test]
        fn prop_scores_always_within_bounds(score in -1_000.0f64..1_000.0) {
            let validator = SchemaValidator::default_config();
            let mut item = initiative();
            item["operationalEfficiencyScore"] = json!(score);

            let (validated, violations) = validator.validate_initiative(0, &item).unwrap();
            let oe = validated.dimensions.operational_efficiency;
            prop_assert!((0.0..=100.0).contains(&oe));

            let out_of_range = !(0.0..=100.0).contains(&score);
            prop_assert_eq!(violations.len(), usize::from(out_of_range));
            if !out_of_range {
                prop_assert_eq!(oe, score);
            }
        }
    }
}
