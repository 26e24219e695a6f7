//! Initiative module - digital-transformation activities described in a report

use crate::{
    ConfidenceLevel, DisclosureScores, DisclosureTier, InitiativeCategory, InnovationLevel,
    PlctDimension, PlctScores, StakeholderScores,
};
use std::fmt;

/// One entry of a structured sub-object: a bare item or a labelled value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEntry {
    /// Key for key-value entries (`None` for plain list items)
    pub label: Option<String>,
    /// Entry text
    pub value: String,
}

impl DetailEntry {
    /// Plain list item
    pub fn item(value: impl Into<String>) -> Self {
        Self {
            label: None,
            value: value.into(),
        }
    }

    /// Labelled value
    pub fn pair(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            value: value.into(),
        }
    }
}

impl fmt::Display for DetailEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}: {}", label, self.value),
            None => f.write_str(&self.value),
        }
    }
}

/// Structured sub-objects attached to an initiative
///
/// Each is a small ordered list; an empty list means the field was absent or
/// could not be parsed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredDetails {
    /// Technologies named for the initiative
    pub technology_used: Vec<String>,
    /// Departments involved
    pub department: Vec<String>,
    /// Timeline facts (start, duration, phases, ...)
    pub timeline: Vec<DetailEntry>,
    /// Success metrics (baseline, target, KPIs, ...)
    pub success_metrics: Vec<DetailEntry>,
}

impl StructuredDetails {
    /// Number of sub-fields with at least one entry (0-4)
    pub fn populated_count(&self) -> usize {
        [
            !self.technology_used.is_empty(),
            !self.department.is_empty(),
            !self.timeline.is_empty(),
            !self.success_metrics.is_empty(),
        ]
        .iter()
        .filter(|populated| **populated)
        .count()
    }
}

/// Engine-supplied initiative fields after validation
///
/// Every score is guaranteed to lie in [0, 100] and every enum is a member
/// of its closed set (possibly the `Unclassified` sentinel).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInitiative {
    /// Free-text description
    pub description: String,
    /// Initiative category
    pub category: InitiativeCategory,
    /// Raw PLCT dimension scores
    pub dimensions: PlctScores,
    /// Disclosure-quality sub-scores
    pub disclosure: DisclosureScores,
    /// Structured sub-objects
    pub details: StructuredDetails,
    /// Innovation level
    pub innovation_level: InnovationLevel,
    /// Expected outcome
    pub expected_impact: Option<String>,
    /// Investment amount or scale, as written
    pub investment_amount: Option<String>,
    /// Business case
    pub business_rationale: Option<String>,
    /// Confidence claimed by the engine; advisory only
    pub reported_confidence: Option<String>,
}

/// Values derived by the scoring rules, never supplied by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitiativeScoring {
    /// Stakeholder-weighted composites
    pub stakeholder: StakeholderScores,
    /// Mean of the disclosure sub-scores, rounded
    pub disclosure_aggregate: u8,
    /// Tier bucketed from the aggregate
    pub disclosure_tier: DisclosureTier,
    /// Rubric-derived confidence
    pub confidence: ConfidenceLevel,
    /// Sum of the four dimensions (0-400)
    pub total_plct: f64,
    /// Highest-scoring dimension
    pub dominant_dimension: PlctDimension,
    /// Set when confidence is below High
    pub flagged_for_verification: bool,
}

/// A fully scored initiative, ready to be attached to a company
#[derive(Debug, Clone, PartialEq)]
pub struct Initiative {
    /// Validated engine fields
    pub fields: ValidatedInitiative,
    /// Derived scores
    pub scoring: InitiativeScoring,
}

impl Initiative {
    /// Initiative description
    pub fn description(&self) -> &str {
        &self.fields.description
    }

    /// Rubric-derived confidence level
    pub fn confidence(&self) -> ConfidenceLevel {
        self.scoring.confidence
    }

    /// Disclosure-quality aggregate
    pub fn disclosure_aggregate(&self) -> u8 {
        self.scoring.disclosure_aggregate
    }
}
