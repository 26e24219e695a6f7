//! Scoring module
//!
//! Deterministic derivation of every score the reasoning engine is not
//! trusted to compute: stakeholder-weighted composites, the disclosure
//! aggregate and tier, the confidence level, total PLCT and the dominant
//! dimension. Everything here is a pure function of its inputs.

use crate::{
    ConfidenceLevel, DisclosureScores, DisclosureTier, Initiative, InitiativeScoring, PlctScores,
    ScoredPayload, StakeholderScores, ValidatedInitiative, ValidatedPayload,
};

/// Weights applied to (CX, PE, OE, BM) for one stakeholder viewpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakeholderWeights {
    /// Customer Experience weight
    pub customer_experience: f64,
    /// People Empowerment weight
    pub people_empowerment: f64,
    /// Operational Efficiency weight
    pub operational_efficiency: f64,
    /// New Business Models weight
    pub new_business_models: f64,
}

impl StakeholderWeights {
    /// Sum of the four weights
    pub fn sum(&self) -> f64 {
        self.customer_experience
            + self.people_empowerment
            + self.operational_efficiency
            + self.new_business_models
    }

    /// Weighted linear combination of the dimensions
    pub fn apply(&self, scores: &PlctScores) -> f64 {
        self.customer_experience * scores.customer_experience
            + self.people_empowerment * scores.people_empowerment
            + self.operational_efficiency * scores.operational_efficiency
            + self.new_business_models * scores.new_business_models
    }
}

/// Investors weigh customer, efficiency and business-model impact equally
pub const INVESTOR_WEIGHTS: StakeholderWeights = StakeholderWeights {
    customer_experience: 0.30,
    people_empowerment: 0.10,
    operational_efficiency: 0.30,
    new_business_models: 0.30,
};

/// Policy makers emphasise workforce impact
pub const POLICY_WEIGHTS: StakeholderWeights = StakeholderWeights {
    customer_experience: 0.20,
    people_empowerment: 0.40,
    operational_efficiency: 0.20,
    new_business_models: 0.20,
};

/// Balanced strategic view
pub const STRATEGIC_WEIGHTS: StakeholderWeights = StakeholderWeights {
    customer_experience: 0.25,
    people_empowerment: 0.25,
    operational_efficiency: 0.25,
    new_business_models: 0.25,
};

/// Minimum disclosure aggregate for High confidence (default: 70)
pub const HIGH_CONFIDENCE_AGGREGATE: u8 = 70;

/// Minimum populated structured sub-fields for High confidence (default: 3)
pub const HIGH_CONFIDENCE_MIN_DETAILS: usize = 3;

/// Minimum disclosure aggregate for Medium confidence (default: 40)
pub const MEDIUM_CONFIDENCE_AGGREGATE: u8 = 40;

/// Thresholds of the confidence rule
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Aggregate needed for High
    pub high_aggregate: u8,
    /// Populated structured sub-fields needed for High
    pub high_min_details: usize,
    /// Aggregate needed for Medium
    pub medium_aggregate: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            high_aggregate: HIGH_CONFIDENCE_AGGREGATE,
            high_min_details: HIGH_CONFIDENCE_MIN_DETAILS,
            medium_aggregate: MEDIUM_CONFIDENCE_AGGREGATE,
        }
    }
}

impl ScoringConfig {
    /// Validate the thresholds
    pub fn validate(&self) -> Result<(), String> {
        if self.high_aggregate > 100 || self.medium_aggregate > 100 {
            return Err("confidence thresholds must be within 0-100".to_string());
        }
        if self.medium_aggregate > self.high_aggregate {
            return Err("medium_aggregate cannot exceed high_aggregate".to_string());
        }
        if self.high_min_details > 4 {
            return Err("high_min_details cannot exceed the 4 structured sub-fields".to_string());
        }
        Ok(())
    }
}

/// Computes derived scores from validated payloads
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Create an engine with the given thresholds
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Create an engine with the default thresholds
    pub fn default_config() -> Self {
        Self::new(ScoringConfig::default())
    }

    /// Thresholds in use
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every initiative of a validated payload
    pub fn score(&self, payload: &ValidatedPayload) -> ScoredPayload {
        ScoredPayload {
            company: payload.company.clone(),
            initiatives: payload
                .initiatives
                .iter()
                .map(|initiative| self.score_initiative(initiative))
                .collect(),
        }
    }

    /// Score a single validated initiative
    pub fn score_initiative(&self, initiative: &ValidatedInitiative) -> Initiative {
        let aggregate = disclosure_aggregate(&initiative.disclosure);
        let confidence = self.confidence(aggregate, initiative.details.populated_count());

        let scoring = InitiativeScoring {
            stakeholder: stakeholder_composites(&initiative.dimensions),
            disclosure_aggregate: aggregate,
            disclosure_tier: DisclosureTier::from_aggregate(aggregate),
            confidence,
            total_plct: round2(initiative.dimensions.total()),
            dominant_dimension: initiative.dimensions.dominant(),
            flagged_for_verification: confidence != ConfidenceLevel::High,
        };

        Initiative {
            fields: initiative.clone(),
            scoring,
        }
    }

    /// The confidence rule
    ///
    /// High when the aggregate reaches `high_aggregate` and at least
    /// `high_min_details` structured sub-fields are populated; Medium when the
    /// aggregate reaches `medium_aggregate`; Low otherwise.
    pub fn confidence(&self, aggregate: u8, populated_details: usize) -> ConfidenceLevel {
        if aggregate >= self.config.high_aggregate
            && populated_details >= self.config.high_min_details
        {
            ConfidenceLevel::High
        } else if aggregate >= self.config.medium_aggregate {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Investor, Policy and Strategic composites, rounded to two decimals
pub fn stakeholder_composites(scores: &PlctScores) -> StakeholderScores {
    StakeholderScores {
        investor: round2(INVESTOR_WEIGHTS.apply(scores)),
        policy: round2(POLICY_WEIGHTS.apply(scores)),
        strategic: round2(STRATEGIC_WEIGHTS.apply(scores)),
    }
}

/// Arithmetic mean of the five sub-scores, rounded to the nearest integer
pub fn disclosure_aggregate(disclosure: &DisclosureScores) -> u8 {
    let values = disclosure.as_array();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
