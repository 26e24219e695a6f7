//! Levels module - ordinal categories attached to companies and initiatives

use crate::label::normalize_label;
use std::fmt;

/// Digital maturity of a company as described in its report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaturityLevel {
    /// Isolated digital projects
    Basic,
    /// Coordinated programmes in progress
    Developing,
    /// Digital capabilities embedded across functions
    Advanced,
    /// Digital drives the business model
    Leading,
    /// Sentinel for unrecognized values
    Unclassified,
}

impl MaturityLevel {
    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityLevel::Basic => "Basic",
            MaturityLevel::Developing => "Developing",
            MaturityLevel::Advanced => "Advanced",
            MaturityLevel::Leading => "Leading",
            MaturityLevel::Unclassified => "Unclassified",
        }
    }

    /// Parse a maturity label (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "basic" => Some(MaturityLevel::Basic),
            "developing" => Some(MaturityLevel::Developing),
            "advanced" => Some(MaturityLevel::Advanced),
            "leading" => Some(MaturityLevel::Leading),
            "unclassified" => Some(MaturityLevel::Unclassified),
            _ => None,
        }
    }

    /// Labels the engine may use
    pub fn labels() -> Vec<&'static str> {
        vec!["Basic", "Developing", "Advanced", "Leading"]
    }
}

/// Strategic priority the company gives to digital transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategicPriority {
    /// Low priority
    Low,
    /// Medium priority
    Medium,
    /// High priority
    High,
    /// Sentinel for unrecognized values
    Unclassified,
}

impl StrategicPriority {
    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategicPriority::Low => "Low",
            StrategicPriority::Medium => "Medium",
            StrategicPriority::High => "High",
            StrategicPriority::Unclassified => "Unclassified",
        }
    }

    /// Parse a priority label (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "low" => Some(StrategicPriority::Low),
            "medium" | "moderate" => Some(StrategicPriority::Medium),
            "high" => Some(StrategicPriority::High),
            "unclassified" => Some(StrategicPriority::Unclassified),
            _ => None,
        }
    }

    /// Labels the engine may use
    pub fn labels() -> Vec<&'static str> {
        vec!["Low", "Medium", "High"]
    }
}

/// How far an initiative departs from the company's existing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InnovationLevel {
    /// Improves an existing process
    Incremental,
    /// Noticeable change within a function
    Moderate,
    /// Changes how the business operates or earns revenue
    Transformational,
    /// Sentinel for unrecognized values
    Unclassified,
}

impl InnovationLevel {
    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            InnovationLevel::Incremental => "Incremental",
            InnovationLevel::Moderate => "Moderate",
            InnovationLevel::Transformational => "Transformational",
            InnovationLevel::Unclassified => "Unclassified",
        }
    }

    /// Parse an innovation label (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "incremental" => Some(InnovationLevel::Incremental),
            "moderate" => Some(InnovationLevel::Moderate),
            "transformational" | "transformative" => Some(InnovationLevel::Transformational),
            "unclassified" => Some(InnovationLevel::Unclassified),
            _ => None,
        }
    }

    /// Labels the engine may use
    pub fn labels() -> Vec<&'static str> {
        vec!["Incremental", "Moderate", "Transformational"]
    }
}

/// Rubric-derived trust signal for an extracted initiative
///
/// Always computed by [`crate::ScoringEngine`]; never parsed from engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfidenceLevel {
    /// Weak disclosure, needs verification
    Low,
    /// Usable with caution
    Medium,
    /// Well-disclosed with structured details
    High,
}

impl ConfidenceLevel {
    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
        }
    }

    /// Parse a stored confidence label
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "low" => Some(ConfidenceLevel::Low),
            "medium" => Some(ConfidenceLevel::Medium),
            "high" => Some(ConfidenceLevel::High),
            _ => None,
        }
    }
}

/// Quality tier bucketed from the disclosure aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisclosureTier {
    /// 80-100
    Comprehensive,
    /// 60-79
    Good,
    /// 40-59
    Moderate,
    /// 0-39
    Limited,
}

impl DisclosureTier {
    /// Bucket a disclosure aggregate (0-100)
    pub fn from_aggregate(aggregate: u8) -> Self {
        match aggregate {
            80.. => DisclosureTier::Comprehensive,
            60..=79 => DisclosureTier::Good,
            40..=59 => DisclosureTier::Moderate,
            _ => DisclosureTier::Limited,
        }
    }

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            DisclosureTier::Comprehensive => "Comprehensive",
            DisclosureTier::Good => "Good",
            DisclosureTier::Moderate => "Moderate",
            DisclosureTier::Limited => "Limited",
        }
    }

    /// Parse a stored tier label
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_label(s).as_str() {
            "comprehensive" => Some(DisclosureTier::Comprehensive),
            "good" => Some(DisclosureTier::Good),
            "moderate" => Some(DisclosureTier::Moderate),
            "limited" => Some(DisclosureTier::Limited),
            _ => None,
        }
    }
}

macro_rules! impl_label_traits {
    ($($ty:ident),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl std::str::FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::parse(s).ok_or_else(|| format!("Invalid {}: {}", stringify!($ty), s))
                }
            }
        )*
    };
}

impl_label_traits!(
    MaturityLevel,
    StrategicPriority,
    InnovationLevel,
    ConfidenceLevel,
    DisclosureTier,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maturity_parse() {
        assert_eq!(MaturityLevel::parse("advanced"), Some(MaturityLevel::Advanced));
        assert_eq!(MaturityLevel::parse(" LEADING "), Some(MaturityLevel::Leading));
        assert_eq!(MaturityLevel::parse("Expert"), None);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(StrategicPriority::parse("Moderate"), Some(StrategicPriority::Medium));
        assert!("urgent".parse::<StrategicPriority>().is_err());
    }

    #[test]
    fn test_disclosure_tier_boundaries() {
        assert_eq!(DisclosureTier::from_aggregate(100), DisclosureTier::Comprehensive);
        assert_eq!(DisclosureTier::from_aggregate(80), DisclosureTier::Comprehensive);
        assert_eq!(DisclosureTier::from_aggregate(79), DisclosureTier::Good);
        assert_eq!(DisclosureTier::from_aggregate(60), DisclosureTier::Good);
        assert_eq!(DisclosureTier::from_aggregate(59), DisclosureTier::Moderate);
        assert_eq!(DisclosureTier::from_aggregate(40), DisclosureTier::Moderate);
        assert_eq!(DisclosureTier::from_aggregate(39), DisclosureTier::Limited);
        assert_eq!(DisclosureTier::from_aggregate(0), DisclosureTier::Limited);
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(ConfidenceLevel::High > ConfidenceLevel::Medium);
        assert!(ConfidenceLevel::Medium > ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::High.to_string(), "High");
    }
}
