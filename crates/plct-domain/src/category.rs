//! Initiative categories

use crate::label::normalize_label;
use std::fmt;

/// Category of a digital-transformation initiative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitiativeCategory {
    /// RPA, workflow automation
    ProcessAutomation,
    /// AI and machine learning
    ArtificialIntelligence,
    /// Analytics, BI, big data
    DataAnalytics,
    /// Cloud migration and infrastructure
    CloudInfrastructure,
    /// Customer-facing digital channels
    CustomerPlatform,
    /// Security and data protection
    Cybersecurity,
    /// Collaboration tools and workforce enablement
    DigitalWorkplace,
    /// ERP, CRM and core systems
    EnterpriseSystems,
    /// Sensors, connected equipment, smart factories
    InternetOfThings,
    /// Payment rails, e-wallets
    DigitalPayments,
    /// Online sales channels
    ECommerce,
    /// Sentinel for unrecognized values
    Unclassified,
}

impl InitiativeCategory {
    /// All classified categories (excludes the sentinel)
    pub const CLASSIFIED: [InitiativeCategory; 11] = [
        InitiativeCategory::ProcessAutomation,
        InitiativeCategory::ArtificialIntelligence,
        InitiativeCategory::DataAnalytics,
        InitiativeCategory::CloudInfrastructure,
        InitiativeCategory::CustomerPlatform,
        InitiativeCategory::Cybersecurity,
        InitiativeCategory::DigitalWorkplace,
        InitiativeCategory::EnterpriseSystems,
        InitiativeCategory::InternetOfThings,
        InitiativeCategory::DigitalPayments,
        InitiativeCategory::ECommerce,
    ];

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            InitiativeCategory::ProcessAutomation => "Process Automation",
            InitiativeCategory::ArtificialIntelligence => "Artificial Intelligence",
            InitiativeCategory::DataAnalytics => "Data Analytics",
            InitiativeCategory::CloudInfrastructure => "Cloud Infrastructure",
            InitiativeCategory::CustomerPlatform => "Customer Platform",
            InitiativeCategory::Cybersecurity => "Cybersecurity",
            InitiativeCategory::DigitalWorkplace => "Digital Workplace",
            InitiativeCategory::EnterpriseSystems => "Enterprise Systems",
            InitiativeCategory::InternetOfThings => "Internet of Things",
            InitiativeCategory::DigitalPayments => "Digital Payments",
            InitiativeCategory::ECommerce => "E-Commerce",
            InitiativeCategory::Unclassified => "Unclassified",
        }
    }

    /// Parse a category label, resolving common aliases
    pub fn parse(s: &str) -> Option<Self> {
        let category = match normalize_label(s).as_str() {
            "process automation" | "automation" | "rpa" | "robotic process automation" => {
                InitiativeCategory::ProcessAutomation
            }
            "artificial intelligence" | "ai" | "machine learning" | "ai and machine learning" => {
                InitiativeCategory::ArtificialIntelligence
            }
            "data analytics" | "analytics" | "big data" | "data and analytics"
            | "business intelligence" => InitiativeCategory::DataAnalytics,
            "cloud infrastructure" | "cloud" | "cloud computing" | "cloud migration" => {
                InitiativeCategory::CloudInfrastructure
            }
            "customer platform" | "customer experience" | "digital channels" | "mobile app"
            | "omnichannel" => InitiativeCategory::CustomerPlatform,
            "cybersecurity" | "cyber security" | "security" | "data protection" => {
                InitiativeCategory::Cybersecurity
            }
            "digital workplace" | "collaboration" | "digital skills" | "workforce" => {
                InitiativeCategory::DigitalWorkplace
            }
            "enterprise systems" | "erp" | "crm" | "core systems" => {
                InitiativeCategory::EnterpriseSystems
            }
            "internet of things" | "iot" | "smart manufacturing" => {
                InitiativeCategory::InternetOfThings
            }
            "digital payments" | "payments" | "fintech" | "e wallet" => {
                InitiativeCategory::DigitalPayments
            }
            "e commerce" | "ecommerce" | "online sales" => InitiativeCategory::ECommerce,
            "unclassified" => InitiativeCategory::Unclassified,
            _ => return None,
        };
        Some(category)
    }

    /// Labels the engine may use
    pub fn labels() -> Vec<&'static str> {
        Self::CLASSIFIED.iter().map(|c| c.as_str()).collect()
    }
}

impl fmt::Display for InitiativeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InitiativeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid initiative category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for category in InitiativeCategory::CLASSIFIED {
            assert_eq!(InitiativeCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(InitiativeCategory::parse("RPA"), Some(InitiativeCategory::ProcessAutomation));
        assert_eq!(InitiativeCategory::parse("AI"), Some(InitiativeCategory::ArtificialIntelligence));
        assert_eq!(InitiativeCategory::parse("ecommerce"), Some(InitiativeCategory::ECommerce));
        assert_eq!(InitiativeCategory::parse("Blockchain"), None);
    }
}
