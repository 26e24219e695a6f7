//! Integration tests for plct-store
//!
//! These tests verify persistence, resume bookkeeping and snapshots.

use plct_domain::traits::{PersistenceGateway, RecordReader};
use plct_domain::{
    Company, CompanyProfile, DetailEntry, DisclosureScores, DocumentFingerprint, Initiative,
    InitiativeCategory, InnovationLevel, MaturityLevel, PlctScores, ScoringEngine, Sector, SnapshotFilter,
    StrategicPriority, StructuredDetails, ValidatedInitiative,
};
use plct_store::SqliteStore;

fn profile(name: &str, year: u16, sector: Sector) -> CompanyProfile {
    CompanyProfile {
        name: name.to_string(),
        report_year: year,
        sector,
        maturity: MaturityLevel::Developing,
        strategic_priority: StrategicPriority::High,
    }
}

fn initiative(description: &str, dims: PlctScores) -> Initiative {
    let fields = ValidatedInitiative {
        description: description.to_string(),
        category: InitiativeCategory::CloudInfrastructure,
        dimensions: dims,
        disclosure: DisclosureScores {
            investment: 80.0,
            timeline: 70.0,
            metrics: 75.0,
            technical: 90.0,
            rationale: 60.0,
        },
        details: StructuredDetails {
            technology_used: vec!["AWS".to_string(), "Kubernetes".to_string()],
            department: vec!["IT".to_string()],
            timeline: vec![DetailEntry::pair("start", "2022"), DetailEntry::item("phase two in 2024")],
            success_metrics: vec![DetailEntry::pair("target", "99.9% uptime")],
        },
        innovation_level: InnovationLevel::Moderate,
        expected_impact: Some("Lower infrastructure cost".to_string()),
        investment_amount: Some("RM 12 million".to_string()),
        business_rationale: None,
        reported_confidence: Some("High".to_string()),
    };
    ScoringEngine::default_config().score_initiative(&fields)
}

fn company(profile: CompanyProfile, initiatives: &[Initiative]) -> Company {
    let dims: Vec<PlctScores> = initiatives.iter().map(|i| i.fields.dimensions).collect();
    Company {
        profile,
        dimensions: PlctScores::mean(&dims).unwrap_or_default(),
        has_no_valid_initiatives: initiatives.is_empty(),
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_persist_and_read_back() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let initiatives = vec![
        initiative("Cloud migration of core systems", PlctScores::new(40.0, 20.0, 80.0, 30.0)),
        initiative("Mobile banking relaunch", PlctScores::new(90.0, 10.0, 30.0, 50.0)),
    ];
    let record = company(profile("Acme Berhad", 2023, Sector::FinancialServices), &initiatives);
    let fingerprint = DocumentFingerprint::new("abc123");

    let receipt = store
        .persist_document("acme-2023.pdf", &fingerprint, &record, &initiatives)
        .unwrap();
    assert_eq!(receipt.initiatives_written, 2);
    assert_eq!(receipt.initiatives_replaced, 0);
    assert!(store.is_processed(&fingerprint).unwrap());

    let stored = store.initiatives_for(receipt.company_id).unwrap();
    assert_eq!(stored, initiatives, "Initiatives should round-trip in insertion order");

    let summary = store.company(receipt.company_id).unwrap().unwrap();
    assert_eq!(summary.initiative_count, 2);
    assert_eq!(summary.company.profile, record.profile);
    assert!(approx(summary.company.dimensions.customer_experience, 65.0));
    assert!(approx(summary.company.dimensions.operational_efficiency, 55.0));
    assert!(!summary.company.has_no_valid_initiatives);
}

#[test]
fn test_rerun_replaces_instead_of_duplicating() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let fingerprint = DocumentFingerprint::new("same-bytes");
    let first = vec![
        initiative("Data lake", PlctScores::new(10.0, 10.0, 60.0, 20.0)),
        initiative("Chatbot", PlctScores::new(70.0, 10.0, 40.0, 10.0)),
    ];
    let second = vec![initiative("Data lake", PlctScores::new(12.0, 10.0, 58.0, 20.0))];

    store
        .persist_document("a.pdf", &fingerprint, &company(profile("Beta Bhd", 2022, Sector::Technology), &first), &first)
        .unwrap();
    let receipt = store
        .persist_document("a.pdf", &fingerprint, &company(profile("beta bhd ", 2022, Sector::Technology), &second), &second)
        .unwrap();

    assert_eq!(receipt.initiatives_replaced, 2);
    assert_eq!(store.initiatives_for(receipt.company_id).unwrap().len(), 1);

    let snapshot = store.snapshot(&SnapshotFilter::default()).unwrap();
    assert_eq!(snapshot.companies.len(), 1, "Name matching is case-insensitive");
    assert_eq!(snapshot.initiative_total(), 1);
    assert_eq!(store.processed_count().unwrap(), 1);
}

#[test]
fn test_upsert_company_is_keyed_on_name_and_year() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let first = company(profile("Gamma Holdings", 2021, Sector::Energy), &[]);
    let again = company(profile("  GAMMA holdings", 2021, Sector::Utilities), &[]);

    let id = store.upsert_company(&first).unwrap();
    assert_eq!(store.upsert_company(&again).unwrap(), id);

    let snapshot = store
        .snapshot(&SnapshotFilter {
            include_flagged: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(snapshot.companies.len(), 1);
    assert_eq!(snapshot.companies[0].company.profile.sector, Sector::Utilities, "Later values overwrite");

    let next_year = company(profile("Gamma Holdings", 2022, Sector::Energy), &[]);
    assert_ne!(store.upsert_company(&next_year).unwrap(), id);
}

#[test]
fn test_insert_initiatives_replaces_by_fingerprint() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let initiatives = vec![
        initiative("Smart meter rollout", PlctScores::new(50.0, 20.0, 70.0, 40.0)),
        initiative("Grid analytics platform", PlctScores::new(30.0, 40.0, 90.0, 20.0)),
    ];
    let id = store
        .upsert_company(&company(profile("Delta Power", 2023, Sector::Utilities), &[]))
        .unwrap();
    let fingerprint = DocumentFingerprint::new("delta-2023");

    assert_eq!(store.insert_initiatives(id, &fingerprint, &initiatives).unwrap(), 2);
    assert_eq!(store.insert_initiatives(id, &fingerprint, &initiatives).unwrap(), 2);
    assert_eq!(store.initiatives_for(id).unwrap().len(), 2, "Same fingerprint must not double rows");

    let summary = store.company(id).unwrap().unwrap();
    assert!(approx(summary.company.dimensions.operational_efficiency, 80.0));
    assert!(!summary.company.has_no_valid_initiatives);

    // Only persist_document marks a document as processed
    assert!(!store.is_processed(&fingerprint).unwrap());
}

#[test]
fn test_company_without_initiatives_is_flagged() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let record = company(profile("Gamma Plantations", 2021, Sector::Plantation), &[]);

    let receipt = store
        .persist_document("gamma.pdf", &DocumentFingerprint::new("g"), &record, &[])
        .unwrap();
    assert_eq!(receipt.initiatives_written, 0);

    let hidden = store.snapshot(&SnapshotFilter::default()).unwrap();
    assert!(hidden.companies.is_empty());

    let shown = store
        .snapshot(&SnapshotFilter {
            include_flagged: true,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(shown.companies.len(), 1);
    assert!(shown.companies[0].company.has_no_valid_initiatives);
    assert_eq!(shown.companies[0].company.dimensions, PlctScores::default());
}

#[test]
fn test_two_documents_for_same_company_year() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let a = vec![initiative("ERP upgrade", PlctScores::new(0.0, 0.0, 100.0, 0.0))];
    let b = vec![initiative("E-invoicing", PlctScores::new(0.0, 0.0, 50.0, 0.0))];
    let acme = profile("Acme Berhad", 2023, Sector::IndustrialProductsAndServices);

    store
        .persist_document("annual.pdf", &DocumentFingerprint::new("a"), &company(acme.clone(), &a), &a)
        .unwrap();
    let receipt = store
        .persist_document("sustainability.pdf", &DocumentFingerprint::new("b"), &company(acme, &b), &b)
        .unwrap();

    let summary = store.company(receipt.company_id).unwrap().unwrap();
    assert_eq!(summary.initiative_count, 2);
    assert!(approx(summary.company.dimensions.operational_efficiency, 75.0));
}

#[test]
fn test_snapshot_filters() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let rows = [
        ("Alpha", 2022, Sector::Technology, "1"),
        ("Bravo", 2023, Sector::Technology, "2"),
        ("Charlie", 2023, Sector::Energy, "3"),
    ];
    for (name, year, sector, fp) in rows {
        let items = vec![initiative(&format!("{} initiative", name), PlctScores::new(50.0, 50.0, 50.0, 50.0))];
        store
            .persist_document(name, &DocumentFingerprint::new(fp), &company(profile(name, year, sector), &items), &items)
            .unwrap();
    }

    let tech = store
        .snapshot(&SnapshotFilter {
            sector: Some(Sector::Technology),
            ..Default::default()
        })
        .unwrap();
    let names: Vec<&str> = tech.companies.iter().map(|c| c.company.name()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo"]);

    let year = store
        .snapshot(&SnapshotFilter {
            report_year: Some(2023),
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(year.companies.len(), 1);
    assert_eq!(year.companies[0].company.name(), "Bravo");
    assert!(year.taken_at_secs > 0);
}

#[test]
fn test_failed_persist_leaves_nothing_behind() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let mut bad = initiative("Out of range", PlctScores::new(50.0, 50.0, 50.0, 50.0));
    // Bypasses validation to trip the CHECK constraint
    bad.fields.dimensions.customer_experience = 150.0;
    let good = initiative("Fine", PlctScores::new(50.0, 50.0, 50.0, 50.0));
    let items = vec![good, bad];
    let fingerprint = DocumentFingerprint::new("broken");

    let record = company(profile("Delta", 2023, Sector::Utilities), &items[..1]);
    let result = store.persist_document("delta.pdf", &fingerprint, &record, &items);

    assert!(result.is_err());
    assert!(!store.is_processed(&fingerprint).unwrap());
    let snapshot = store
        .snapshot(&SnapshotFilter {
            include_flagged: true,
            ..Default::default()
        })
        .unwrap();
    assert!(snapshot.companies.is_empty(), "Company insert must roll back too");
}

#[test]
fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plct.db");
    let fingerprint = DocumentFingerprint::new("persisted");

    {
        let mut store = SqliteStore::new(&path).unwrap();
        let items = vec![initiative("IoT sensors", PlctScores::new(20.0, 20.0, 70.0, 10.0))];
        store
            .persist_document("iot.pdf", &fingerprint, &company(profile("Echo", 2020, Sector::Energy), &items), &items)
            .unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    assert!(store.is_processed(&fingerprint).unwrap());
    assert!(!store.is_processed(&DocumentFingerprint::new("other")).unwrap());
}
