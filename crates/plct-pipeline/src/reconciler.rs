//! Record reconciliation: one document's scored payload into a Company and its Initiatives

use crate::{DedupPolicy, PipelineError, ReconcilerConfig};
use plct_domain::{Company, Document, Initiative, PlctScores, ScoredPayload, Sector};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Output of [`RecordReconciler::reconcile`]
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Company record with aggregate dimensions
    pub company: Company,
    /// Surviving initiatives in engine order
    pub initiatives: Vec<Initiative>,
    /// Initiatives dropped as duplicates
    pub duplicates_dropped: usize,
}

/// Deduplicates initiatives and derives the company aggregate
pub struct RecordReconciler {
    config: ReconcilerConfig,
    overrides: HashMap<String, Sector>,
}

impl RecordReconciler {
    /// Create a reconciler with the given configuration
    pub fn new(config: ReconcilerConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        let overrides = config
            .sector_overrides
            .iter()
            .filter_map(|(name, label)| Sector::parse(label).map(|sector| (normalize_text(name), sector)))
            .collect();
        Ok(Self { config, overrides })
    }

    /// Create a reconciler with default configuration
    pub fn default_config() -> Self {
        Self {
            config: ReconcilerConfig::default(),
            overrides: HashMap::new(),
        }
    }

    /// Reconciler configuration
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Build the Company and its ordered Initiatives from one document's payload
    ///
    /// Of two duplicate initiatives the one with the higher disclosure
    /// aggregate is kept (the earlier one on a tie), in the position of the
    /// first occurrence. A company left with no initiatives is still
    /// returned, flagged with `has_no_valid_initiatives`.
    pub fn reconcile(&self, document: &Document, scored: ScoredPayload) -> Reconciled {
        let mut kept: Vec<(String, Initiative)> = Vec::with_capacity(scored.initiatives.len());
        let mut duplicates_dropped = 0;

        for initiative in scored.initiatives {
            let key = normalize_text(initiative.description());
            match kept.iter().position(|(existing, _)| self.is_duplicate(existing, &key)) {
                Some(index) => {
                    duplicates_dropped += 1;
                    let current = &kept[index].1;
                    let replace = initiative.disclosure_aggregate() > current.disclosure_aggregate();
                    let (winner, loser) = if replace {
                        (&initiative, current)
                    } else {
                        (current, &initiative)
                    };
                    warn!(
                        document = %document.identifier(),
                        kept = %winner.description(),
                        kept_disclosure = winner.disclosure_aggregate(),
                        dropped = %loser.description(),
                        dropped_disclosure = loser.disclosure_aggregate(),
                        "Duplicate initiative dropped"
                    );
                    if replace {
                        kept[index] = (key, initiative);
                    }
                }
                None => kept.push((key, initiative)),
            }
        }

        let initiatives: Vec<Initiative> = kept.into_iter().map(|(_, initiative)| initiative).collect();

        let mut profile = scored.company;
        if let Some(sector) = self.overrides.get(&normalize_text(&profile.name)) {
            if *sector != profile.sector {
                debug!(
                    company = %profile.name,
                    from = %profile.sector,
                    to = %sector,
                    "Applying sector override"
                );
                profile.sector = *sector;
            }
        }

        let raw: Vec<PlctScores> = initiatives.iter().map(|i| i.fields.dimensions).collect();
        let has_no_valid_initiatives = initiatives.is_empty();
        if has_no_valid_initiatives {
            warn!(
                document = %document.identifier(),
                company = %profile.name,
                "No valid initiatives; company flagged"
            );
        }

        Reconciled {
            company: Company {
                profile,
                dimensions: PlctScores::mean(&raw).unwrap_or_default(),
                has_no_valid_initiatives,
            },
            initiatives,
            duplicates_dropped,
        }
    }

    fn is_duplicate(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        match self.config.dedup {
            DedupPolicy::Exact => false,
            DedupPolicy::Fuzzy { threshold } => {
                !a.is_empty() && !b.is_empty() && rapidfuzz::fuzz::ratio(a.chars(), b.chars()) >= threshold
            }
        }
    }
}

/// Lowercase, collapse whitespace, trim
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use plct_domain::{
        CompanyProfile, DisclosureScores, DocumentFingerprint, InitiativeCategory, InnovationLevel,
        MaturityLevel, ScoringEngine, StrategicPriority, ValidatedInitiative,
    };
    use std::collections::BTreeMap;

    fn document() -> Document {
        Document::new(
            "report.pdf",
            "/tmp/report.pdf",
            1024,
            3,
            "text".to_string(),
            DocumentFingerprint::new("fp"),
        )
    }

    fn initiative(description: &str, dims: PlctScores, disclosure: f64) -> Initiative {
        let fields = ValidatedInitiative {
            description: description.to_string(),
            category: InitiativeCategory::Unclassified,
            dimensions: dims,
            disclosure: DisclosureScores {
                investment: disclosure,
                timeline: disclosure,
                metrics: disclosure,
                technical: disclosure,
                rationale: disclosure,
            },
            details: Default::default(),
            innovation_level: InnovationLevel::Unclassified,
            expected_impact: None,
            investment_amount: None,
            business_rationale: None,
            reported_confidence: None,
        };
        ScoringEngine::default_config().score_initiative(&fields)
    }

    fn payload(name: &str, initiatives: Vec<Initiative>) -> ScoredPayload {
        ScoredPayload {
            company: CompanyProfile {
                name: name.to_string(),
                report_year: 2023,
                sector: Sector::Technology,
                maturity: MaturityLevel::Advanced,
                strategic_priority: StrategicPriority::High,
            },
            initiatives,
        }
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("  Launched AI   chatbot\tfor customers "),
            "launched ai chatbot for customers"
        );
    }

    #[test]
    fn test_exact_duplicates_keep_higher_disclosure() {
        let reconciler = RecordReconciler::default_config();
        let dims = PlctScores::new(80.0, 20.0, 40.0, 30.0);
        let scored = payload(
            "Acme",
            vec![
                initiative("Launched AI chatbot for customers", dims, 40.0),
                initiative("Cloud migration", dims, 50.0),
                initiative("launched ai chatbot for customers ", dims, 90.0),
            ],
        );

        let result = reconciler.reconcile(&document(), scored);

        assert_eq!(result.duplicates_dropped, 1);
        assert_eq!(result.initiatives.len(), 2);
        assert_eq!(result.initiatives[0].description(), "launched ai chatbot for customers ");
        assert_eq!(result.initiatives[0].disclosure_aggregate(), 90);
        assert_eq!(result.initiatives[1].description(), "Cloud migration");
    }

    #[test]
    fn test_tie_keeps_first() {
        let reconciler = RecordReconciler::default_config();
        let dims = PlctScores::new(10.0, 10.0, 10.0, 10.0);
        let scored = payload(
            "Acme",
            vec![initiative("ERP rollout", dims, 60.0), initiative("erp ROLLOUT", dims, 60.0)],
        );

        let result = reconciler.reconcile(&document(), scored);
        assert_eq!(result.initiatives.len(), 1);
        assert_eq!(result.initiatives[0].description(), "ERP rollout");
    }

    #[test]
    fn test_exact_policy_keeps_near_matches() {
        let dims = PlctScores::new(10.0, 10.0, 10.0, 10.0);
        let items = vec![
            initiative("Launched AI chatbot for customers", dims, 50.0),
            initiative("Launched AI chatbots for customers", dims, 50.0),
        ];

        let exact = RecordReconciler::default_config();
        assert_eq!(exact.reconcile(&document(), payload("Acme", items.clone())).initiatives.len(), 2);

        let fuzzy = RecordReconciler::new(ReconcilerConfig {
            dedup: DedupPolicy::Fuzzy { threshold: 0.9 },
            ..Default::default()
        })
        .unwrap();
        assert_eq!(fuzzy.reconcile(&document(), payload("Acme", items)).initiatives.len(), 1);
    }

    #[test]
    fn test_company_aggregate_is_unweighted_mean() {
        let reconciler = RecordReconciler::default_config();
        let scored = payload(
            "Acme",
            vec![
                initiative("A", PlctScores::new(100.0, 0.0, 50.0, 20.0), 50.0),
                initiative("B", PlctScores::new(50.0, 40.0, 0.0, 60.0), 50.0),
            ],
        );

        let result = reconciler.reconcile(&document(), scored);
        assert_eq!(result.company.dimensions, PlctScores::new(75.0, 20.0, 25.0, 40.0));
        assert!(!result.company.has_no_valid_initiatives);
    }

    #[test]
    fn test_no_initiatives_flags_company() {
        let reconciler = RecordReconciler::default_config();
        let result = reconciler.reconcile(&document(), payload("Acme", Vec::new()));

        assert!(result.company.has_no_valid_initiatives);
        assert_eq!(result.company.dimensions, PlctScores::default());
        assert_eq!(result.company.name(), "Acme");
    }

    #[test]
    fn test_sector_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert("ACME  Berhad".to_string(), "Banking".to_string());
        let reconciler = RecordReconciler::new(ReconcilerConfig {
            sector_overrides: overrides,
            ..Default::default()
        })
        .unwrap();

        let result = reconciler.reconcile(&document(), payload("acme berhad", Vec::new()));
        assert_eq!(result.company.profile.sector, Sector::FinancialServices);

        let result = reconciler.reconcile(&document(), payload("Other Bhd", Vec::new()));
        assert_eq!(result.company.profile.sector, Sector::Technology);
    }
}
