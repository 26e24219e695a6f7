//! Company module - one reporting entity per fiscal year

use crate::{MaturityLevel, PlctScores, Sector, StrategicPriority};
use std::fmt;

/// Storage identifier of a persisted company row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompanyId(i64);

impl CompanyId {
    /// Wrap a raw row id
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Raw row id
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Company-level fields taken from a validated payload
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
    /// Company name as printed in the report
    pub name: String,
    /// Fiscal year the report covers
    pub report_year: u16,
    /// Industry sector
    pub sector: Sector,
    /// Digital maturity
    pub maturity: MaturityLevel,
    /// Strategic priority of digital transformation
    pub strategic_priority: StrategicPriority,
}

impl CompanyProfile {
    /// Natural key used for upserts: (lowercased, trimmed name, year)
    pub fn natural_key(&self) -> (String, u16) {
        (self.name.trim().to_lowercase(), self.report_year)
    }
}

/// A reconciled company record
///
/// Identified by (name, report_year). `dimensions` is the unweighted mean of
/// the surviving initiatives' raw dimensions, or all zeros when
/// `has_no_valid_initiatives` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    /// Company-level fields
    pub profile: CompanyProfile,
    /// Aggregate PLCT dimensions
    pub dimensions: PlctScores,
    /// Set when no initiative survived validation
    pub has_no_valid_initiatives: bool,
}

impl Company {
    /// Company name
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Report year
    pub fn report_year(&self) -> u16 {
        self.profile.report_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_key_ignores_case_and_padding() {
        let a = CompanyProfile {
            name: "Acme Berhad ".to_string(),
            report_year: 2023,
            sector: Sector::Technology,
            maturity: MaturityLevel::Advanced,
            strategic_priority: StrategicPriority::High,
        };
        let mut b = a.clone();
        b.name = "ACME BERHAD".to_string();
        assert_eq!(a.natural_key(), b.natural_key());
    }
}
