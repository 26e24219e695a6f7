//! Sector module - industry classification for reporting companies

use crate::label::normalize_label;
use std::fmt;

/// Industry sector of a reporting company
///
/// The twelve classified sectors follow the stock exchange board
/// classification. Engine output that matches none of them, even after alias
/// resolution, maps to [`Sector::Unclassified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sector {
    /// Industrial products and services (includes manufacturing)
    IndustrialProductsAndServices,
    /// Consumer products and services (includes retail)
    ConsumerProductsAndServices,
    /// Technology
    Technology,
    /// Property and real estate
    Property,
    /// Construction
    Construction,
    /// Energy, oil and gas
    Energy,
    /// Transportation and logistics
    TransportationAndLogistics,
    /// Telecommunications and media
    TelecommunicationsAndMedia,
    /// Health care
    HealthCare,
    /// Utilities
    Utilities,
    /// Plantation and agriculture
    Plantation,
    /// Banking, insurance and other financial services
    FinancialServices,
    /// Sentinel for values outside the classification
    Unclassified,
}

impl Sector {
    /// All classified sectors (excludes the sentinel)
    pub const CLASSIFIED: [Sector; 12] = [
        Sector::IndustrialProductsAndServices,
        Sector::ConsumerProductsAndServices,
        Sector::Technology,
        Sector::Property,
        Sector::Construction,
        Sector::Energy,
        Sector::TransportationAndLogistics,
        Sector::TelecommunicationsAndMedia,
        Sector::HealthCare,
        Sector::Utilities,
        Sector::Plantation,
        Sector::FinancialServices,
    ];

    /// Canonical display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::IndustrialProductsAndServices => "Industrial Products & Services",
            Sector::ConsumerProductsAndServices => "Consumer Products & Services",
            Sector::Technology => "Technology",
            Sector::Property => "Property",
            Sector::Construction => "Construction",
            Sector::Energy => "Energy",
            Sector::TransportationAndLogistics => "Transportation & Logistics",
            Sector::TelecommunicationsAndMedia => "Telecommunications & Media",
            Sector::HealthCare => "Health Care",
            Sector::Utilities => "Utilities",
            Sector::Plantation => "Plantation",
            Sector::FinancialServices => "Financial Services",
            Sector::Unclassified => "Unclassified",
        }
    }

    /// Parse a sector label, resolving common aliases
    ///
    /// Returns `None` for anything outside the classification; callers decide
    /// whether that becomes [`Sector::Unclassified`] plus a violation.
    pub fn parse(s: &str) -> Option<Self> {
        let sector = match normalize_label(s).as_str() {
            "industrial products and services" | "industrial products" | "industrial"
            | "industrials" | "manufacturing" => Sector::IndustrialProductsAndServices,
            "consumer products and services" | "consumer products" | "consumer"
            | "consumer goods" | "retail" => Sector::ConsumerProductsAndServices,
            "technology" | "tech" | "information technology" => Sector::Technology,
            "property" | "real estate" | "reit" | "reits" => Sector::Property,
            "construction" => Sector::Construction,
            "energy" | "oil and gas" => Sector::Energy,
            "transportation and logistics" | "transportation" | "logistics" => {
                Sector::TransportationAndLogistics
            }
            "telecommunications and media" | "telecommunications" | "telecommunication"
            | "telecom" | "media" => Sector::TelecommunicationsAndMedia,
            "health care" | "healthcare" => Sector::HealthCare,
            "utilities" | "utility" => Sector::Utilities,
            "plantation" | "plantations" | "agriculture" => Sector::Plantation,
            "financial services" | "financial" | "finance" | "banking" | "insurance" => {
                Sector::FinancialServices
            }
            "unclassified" => Sector::Unclassified,
            _ => return None,
        };
        Some(sector)
    }

    /// Whether this is the sentinel value
    pub fn is_unclassified(&self) -> bool {
        matches!(self, Sector::Unclassified)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid sector: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_labels_round_trip() {
        for sector in Sector::CLASSIFIED {
            assert_eq!(Sector::parse(sector.as_str()), Some(sector));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Sector::parse("Banking"), Some(Sector::FinancialServices));
        assert_eq!(
            Sector::parse("manufacturing"),
            Some(Sector::IndustrialProductsAndServices)
        );
        assert_eq!(Sector::parse("Real Estate"), Some(Sector::Property));
        assert_eq!(Sector::parse("Healthcare"), Some(Sector::HealthCare));
        assert_eq!(Sector::parse("Agriculture"), Some(Sector::Plantation));
    }

    #[test]
    fn test_unknown_sector() {
        assert_eq!(Sector::parse("Business Services"), None);
        assert!("Space Mining".parse::<Sector>().is_err());
    }
}
