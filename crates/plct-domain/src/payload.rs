//! Payloads passed between validation, scoring and reconciliation

use crate::{CompanyProfile, Initiative, ValidatedInitiative, Violation};

/// An initiative dropped by validation, kept for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedInitiative {
    /// Position in the engine's `initiatives` array
    pub index: usize,
    /// Description, if one was present
    pub description: Option<String>,
    /// Violations that caused the rejection (at least one terminal)
    pub violations: Vec<Violation>,
}

/// Engine output after schema validation and coercion
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    /// Company-level fields
    pub company: CompanyProfile,
    /// Initiatives that passed validation, in engine order
    pub initiatives: Vec<ValidatedInitiative>,
    /// Initiatives rejected outright
    pub rejected: Vec<RejectedInitiative>,
    /// Non-terminal findings on accepted fields
    pub violations: Vec<Violation>,
}

impl ValidatedPayload {
    /// All violations, including those of rejected initiatives
    pub fn all_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .chain(self.rejected.iter().flat_map(|r| r.violations.iter()))
    }
}

/// Validated payload with derived scores attached
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPayload {
    /// Company-level fields
    pub company: CompanyProfile,
    /// Scored initiatives, in engine order
    pub initiatives: Vec<Initiative>,
}
