//! Score value types

use std::fmt;

/// Lower bound of every 0-100 score
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of every 0-100 score
pub const SCORE_MAX: f64 = 100.0;

/// One of the four PLCT dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlctDimension {
    /// Customer Experience (CX)
    CustomerExperience,
    /// People Empowerment (PE)
    PeopleEmpowerment,
    /// Operational Efficiency (OE)
    OperationalEfficiency,
    /// New Business Models (BM)
    NewBusinessModels,
}

impl PlctDimension {
    /// All dimensions in canonical order (also the tie-break order)
    pub const ALL: [PlctDimension; 4] = [
        PlctDimension::CustomerExperience,
        PlctDimension::PeopleEmpowerment,
        PlctDimension::OperationalEfficiency,
        PlctDimension::NewBusinessModels,
    ];

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            PlctDimension::CustomerExperience => "CustomerExperience",
            PlctDimension::PeopleEmpowerment => "PeopleEmpowerment",
            PlctDimension::OperationalEfficiency => "OperationalEfficiency",
            PlctDimension::NewBusinessModels => "NewBusinessModels",
        }
    }

    /// Key of this dimension's score in engine output
    pub fn wire_key(&self) -> &'static str {
        match self {
            PlctDimension::CustomerExperience => "customerExperienceScore",
            PlctDimension::PeopleEmpowerment => "peopleEmpowermentScore",
            PlctDimension::OperationalEfficiency => "operationalEfficiencyScore",
            PlctDimension::NewBusinessModels => "newBusinessModelsScore",
        }
    }

    /// Parse a stored dimension label
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for PlctDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four PLCT dimension scores, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlctScores {
    /// Customer Experience
    pub customer_experience: f64,
    /// People Empowerment
    pub people_empowerment: f64,
    /// Operational Efficiency
    pub operational_efficiency: f64,
    /// New Business Models
    pub new_business_models: f64,
}

impl PlctScores {
    /// Create scores in canonical order (CX, PE, OE, BM)
    pub fn new(cx: f64, pe: f64, oe: f64, bm: f64) -> Self {
        Self {
            customer_experience: cx,
            people_empowerment: pe,
            operational_efficiency: oe,
            new_business_models: bm,
        }
    }

    /// Score for one dimension
    pub fn get(&self, dimension: PlctDimension) -> f64 {
        match dimension {
            PlctDimension::CustomerExperience => self.customer_experience,
            PlctDimension::PeopleEmpowerment => self.people_empowerment,
            PlctDimension::OperationalEfficiency => self.operational_efficiency,
            PlctDimension::NewBusinessModels => self.new_business_models,
        }
    }

    /// Scores in canonical order
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.customer_experience,
            self.people_empowerment,
            self.operational_efficiency,
            self.new_business_models,
        ]
    }

    /// Sum of the four dimensions (0-400)
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Highest-scoring dimension; ties go to the earlier dimension in canonical order
    pub fn dominant(&self) -> PlctDimension {
        let mut best = PlctDimension::CustomerExperience;
        for dimension in PlctDimension::ALL {
            if self.get(dimension) > self.get(best) {
                best = dimension;
            }
        }
        best
    }

    /// Unweighted per-dimension mean, or `None` for an empty slice
    pub fn mean(scores: &[PlctScores]) -> Option<PlctScores> {
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let mut sums = [0.0; 4];
        for s in scores {
            for (sum, value) in sums.iter_mut().zip(s.as_array()) {
                *sum += value;
            }
        }
        Some(PlctScores::new(sums[0] / n, sums[1] / n, sums[2] / n, sums[3] / n))
    }

    /// Whether every dimension lies in [0, 100]
    pub fn is_within_bounds(&self) -> bool {
        self.as_array()
            .iter()
            .all(|v| (SCORE_MIN..=SCORE_MAX).contains(v))
    }
}

/// Stakeholder-weighted composites of the four dimensions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StakeholderScores {
    /// Investor viewpoint
    pub investor: f64,
    /// Policy-maker viewpoint
    pub policy: f64,
    /// Balanced strategic viewpoint
    pub strategic: f64,
}

/// The five disclosure-quality sub-scores, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisclosureScores {
    /// Investment amount disclosure
    pub investment: f64,
    /// Timeline disclosure
    pub timeline: f64,
    /// Metrics and KPI disclosure
    pub metrics: f64,
    /// Technical detail disclosure
    pub technical: f64,
    /// Business rationale disclosure
    pub rationale: f64,
}

impl DisclosureScores {
    /// Sub-scores in canonical order
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.investment,
            self.timeline,
            self.metrics,
            self.technical,
            self.rationale,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_and_dominant() {
        let scores = PlctScores::new(45.0, 35.0, 70.0, 15.0);
        assert_eq!(scores.total(), 165.0);
        assert_eq!(scores.dominant(), PlctDimension::OperationalEfficiency);
    }

    #[test]
    fn test_dominant_tie_goes_to_first() {
        let scores = PlctScores::new(50.0, 80.0, 80.0, 10.0);
        assert_eq!(scores.dominant(), PlctDimension::PeopleEmpowerment);

        let flat = PlctScores::new(40.0, 40.0, 40.0, 40.0);
        assert_eq!(flat.dominant(), PlctDimension::CustomerExperience);
    }

    #[test]
    fn test_mean() {
        let a = PlctScores::new(10.0, 20.0, 30.0, 40.0);
        let b = PlctScores::new(30.0, 40.0, 50.0, 60.0);
        let mean = PlctScores::mean(&[a, b]).unwrap();
        assert_eq!(mean, PlctScores::new(20.0, 30.0, 40.0, 50.0));
        assert!(PlctScores::mean(&[]).is_none());
    }

    #[test]
    fn test_wire_keys() {
        assert_eq!(
            PlctDimension::OperationalEfficiency.wire_key(),
            "operationalEfficiencyScore"
        );
        assert_eq!(
            PlctDimension::parse("newbusinessmodels"),
            Some(PlctDimension::NewBusinessModels)
        );
    }
}
