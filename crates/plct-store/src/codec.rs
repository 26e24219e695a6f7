//! Conversions between rows and domain records

use crate::StoreError;
use plct_domain::{
    Company, CompanyProfile, ConfidenceLevel, DetailEntry, DisclosureScores, DisclosureTier,
    Initiative, InitiativeCategory, InitiativeScoring, InnovationLevel, MaturityLevel, PlctDimension,
    PlctScores, Sector, StakeholderScores, StrategicPriority, StructuredDetails, ValidatedInitiative,
};
use rusqlite::types::Type;
use rusqlite::Row;
use serde_json::{json, Value};

pub(crate) const COMPANY_COLUMNS: &str = "c.id AS id, c.name AS name, c.report_year AS report_year, \
     c.sector AS sector, c.digital_maturity_level AS digital_maturity_level, \
     c.strategic_priority AS strategic_priority, \
     c.customer_experience_score AS customer_experience_score, \
     c.people_empowerment_score AS people_empowerment_score, \
     c.operational_efficiency_score AS operational_efficiency_score, \
     c.new_business_models_score AS new_business_models_score, \
     c.has_no_valid_initiatives AS has_no_valid_initiatives";

pub(crate) const INITIATIVE_COLUMNS: &str = "description, category, \
     customer_experience_score, people_empowerment_score, operational_efficiency_score, new_business_models_score, \
     investor_score, policy_score, strategic_score, \
     investment_disclosure, timeline_disclosure, metrics_disclosure, technical_disclosure, rationale_disclosure, \
     disclosure_aggregate, disclosure_tier, confidence_level, total_plct_score, dominant_dimension, \
     flagged_for_verification, technology_used, department, timeline, success_metrics, innovation_level, \
     expected_impact, investment_amount, business_rationale, reported_confidence";

/// Wrap a decoding failure so it can travel through a row-mapping closure
fn conversion(column: &str, ty: Type, err: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, ty, Box::new(StoreErrorAt(column.to_string(), err)))
}

#[derive(Debug)]
struct StoreErrorAt(String, StoreError);

impl std::fmt::Display for StoreErrorAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "column {}: {}", self.0, self.1)
    }
}

impl std::error::Error for StoreErrorAt {}

fn label<T>(row: &Row<'_>, column: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    parse(&raw).ok_or_else(|| {
        conversion(
            column,
            Type::Text,
            StoreError::InvalidData(format!("Unknown label: {}", raw)),
        )
    })
}

fn json_column<T>(row: &Row<'_>, column: &str, decode: fn(&str) -> Result<T, StoreError>) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    decode(&raw).map_err(|e| conversion(column, Type::Text, e))
}

/// Company record from a row selected with [`COMPANY_COLUMNS`]
pub(crate) fn company_from_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    let year: i64 = row.get("report_year")?;
    let report_year = u16::try_from(year).map_err(|_| {
        conversion(
            "report_year",
            Type::Integer,
            StoreError::InvalidData(format!("Report year out of range: {}", year)),
        )
    })?;

    Ok(Company {
        profile: CompanyProfile {
            name: row.get("name")?,
            report_year,
            sector: label(row, "sector", Sector::parse)?,
            maturity: label(row, "digital_maturity_level", MaturityLevel::parse)?,
            strategic_priority: label(row, "strategic_priority", StrategicPriority::parse)?,
        },
        dimensions: PlctScores::new(
            row.get("customer_experience_score")?,
            row.get("people_empowerment_score")?,
            row.get("operational_efficiency_score")?,
            row.get("new_business_models_score")?,
        ),
        has_no_valid_initiatives: row.get("has_no_valid_initiatives")?,
    })
}

/// Initiative record from a row selected with [`INITIATIVE_COLUMNS`]
pub(crate) fn initiative_from_row(row: &Row<'_>) -> rusqlite::Result<Initiative> {
    let aggregate: i64 = row.get("disclosure_aggregate")?;

    let fields = ValidatedInitiative {
        description: row.get("description")?,
        category: label(row, "category", InitiativeCategory::parse)?,
        dimensions: PlctScores::new(
            row.get("customer_experience_score")?,
            row.get("people_empowerment_score")?,
            row.get("operational_efficiency_score")?,
            row.get("new_business_models_score")?,
        ),
        disclosure: DisclosureScores {
            investment: row.get("investment_disclosure")?,
            timeline: row.get("timeline_disclosure")?,
            metrics: row.get("metrics_disclosure")?,
            technical: row.get("technical_disclosure")?,
            rationale: row.get("rationale_disclosure")?,
        },
        details: StructuredDetails {
            technology_used: json_column(row, "technology_used", decode_list)?,
            department: json_column(row, "department", decode_list)?,
            timeline: json_column(row, "timeline", decode_entries)?,
            success_metrics: json_column(row, "success_metrics", decode_entries)?,
        },
        innovation_level: label(row, "innovation_level", InnovationLevel::parse)?,
        expected_impact: row.get("expected_impact")?,
        investment_amount: row.get("investment_amount")?,
        business_rationale: row.get("business_rationale")?,
        reported_confidence: row.get("reported_confidence")?,
    };

    let scoring = InitiativeScoring {
        stakeholder: StakeholderScores {
            investor: row.get("investor_score")?,
            policy: row.get("policy_score")?,
            strategic: row.get("strategic_score")?,
        },
        disclosure_aggregate: aggregate.clamp(0, 100) as u8,
        disclosure_tier: label(row, "disclosure_tier", DisclosureTier::parse)?,
        confidence: label(row, "confidence_level", ConfidenceLevel::parse)?,
        total_plct: row.get("total_plct_score")?,
        dominant_dimension: label(row, "dominant_dimension", PlctDimension::parse)?,
        flagged_for_verification: row.get("flagged_for_verification")?,
    };

    Ok(Initiative { fields, scoring })
}

/// JSON array of strings
pub(crate) fn encode_list(items: &[String]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(items)?)
}

fn decode_list(raw: &str) -> Result<Vec<String>, StoreError> {
    Ok(serde_json::from_str(raw)?)
}

/// JSON array where plain items are strings and labelled values are
/// `{"label": ..., "value": ...}` objects
pub(crate) fn encode_entries(entries: &[DetailEntry]) -> Result<String, StoreError> {
    let values: Vec<Value> = entries
        .iter()
        .map(|entry| match &entry.label {
            Some(label) => json!({ "label": label, "value": entry.value }),
            None => Value::String(entry.value.clone()),
        })
        .collect();
    Ok(serde_json::to_string(&values)?)
}

fn decode_entries(raw: &str) -> Result<Vec<DetailEntry>, StoreError> {
    let values: Vec<Value> = serde_json::from_str(raw)?;
    values
        .into_iter()
        .map(|value| match value {
            Value::String(item) => Ok(DetailEntry::item(item)),
            Value::Object(map) => {
                let label = map.get("label").and_then(Value::as_str);
                let text = map.get("value").and_then(Value::as_str);
                match (label, text) {
                    (Some(label), Some(text)) => Ok(DetailEntry::pair(label, text)),
                    _ => Err(StoreError::InvalidData("Detail entry without label/value".to_string())),
                }
            }
            other => Err(StoreError::InvalidData(format!("Unexpected detail entry: {}", other))),
        })
        .collect()
}
