//! Validation findings

use std::fmt;

/// What went wrong with a field
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// A field was absent or null
    Missing,
    /// A number fell outside its declared range and was clamped
    OutOfRange {
        /// Value the engine returned
        value: f64,
        /// Value kept after clamping
        clamped_to: f64,
    },
    /// A field had the wrong JSON type
    InvalidType {
        /// Expected type description
        expected: &'static str,
    },
    /// An enum label outside the closed set; mapped to `Unclassified`
    UnknownEnumValue {
        /// Label the engine returned
        value: String,
    },
    /// A nested list/object could not be parsed and was emptied
    MalformedNested {
        /// Parser message
        detail: String,
    },
}

/// A single validation finding
///
/// `terminal` violations reject the record they belong to; the rest are
/// recorded and the record is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// JSON path of the field, e.g. `initiatives[2].operationalEfficiencyScore`
    pub field: String,
    /// Kind of violation
    pub kind: ViolationKind,
    /// Whether the owning record is rejected
    pub terminal: bool,
}

impl Violation {
    /// Non-terminal violation
    pub fn recoverable(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
            terminal: false,
        }
    }

    /// Terminal violation
    pub fn terminal(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
            terminal: true,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "{}: missing", self.field),
            ViolationKind::OutOfRange { value, clamped_to } => {
                write!(f, "{}: {} out of range, clamped to {}", self.field, value, clamped_to)
            }
            ViolationKind::InvalidType { expected } => {
                write!(f, "{}: expected {}", self.field, expected)
            }
            ViolationKind::UnknownEnumValue { value } => {
                write!(f, "{}: unknown value '{}', using Unclassified", self.field, value)
            }
            ViolationKind::MalformedNested { detail } => {
                write!(f, "{}: malformed nested value ({}), emptied", self.field, detail)
            }
        }
    }
}
