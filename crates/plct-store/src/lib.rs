//! PLCT Storage Layer
//!
//! Implements [`PersistenceGateway`] and [`RecordReader`] over SQLite.
//!
//! # Architecture
//!
//! - `companies`: one row per (normalized name, report year)
//! - `initiatives`: scored initiatives, tagged with the fingerprint of the
//!   document they came from
//! - `document_fingerprints`: which documents have been persisted, used to
//!   skip them on later runs
//!
//! One document's company and initiatives are written in a single
//! transaction: either all of them land or none do.
//!
//! # Examples
//!
//! ```no_run
//! use plct_store::SqliteStore;
//!
//! let store = SqliteStore::new("plct.db").unwrap();
//! // Store is now ready for persistence
//! ```

#![warn(missing_docs)]

mod codec;

use codec::{company_from_row, encode_entries, encode_list, initiative_from_row, COMPANY_COLUMNS, INITIATIVE_COLUMNS};
use plct_domain::traits::{PersistReceipt, PersistenceGateway, RecordReader};
use plct_domain::{
    Company, CompanyId, CompanySummary, DocumentFingerprint, Initiative, Snapshot, SnapshotFilter,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Structured field could not be encoded or decoded
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Store settings (the `[store]` section of the CLI configuration)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; `:memory:` for a throwaway database
    pub path: PathBuf,

    /// How long a writer waits on a locked database
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("plct.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

/// SQLite-based implementation of PersistenceGateway
///
/// SQLite connections are not thread-safe. Share one store between workers
/// behind a mutex, or give each thread its own SqliteStore.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open(&StoreConfig {
            path: path.as_ref().to_path_buf(),
            ..StoreConfig::default()
        })
    }

    /// Open (and create if needed) the database described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(&config.path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let mut store = Self { conn };
        store.initialize_schema()?;
        debug!(path = %config.path.display(), "Opened record store");
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Look up one company with its initiative count
    pub fn company(&self, id: CompanyId) -> Result<Option<CompanySummary>, StoreError> {
        let sql = format!(
            "SELECT {}, (SELECT COUNT(*) FROM initiatives i WHERE i.company_id = c.id) AS initiative_count
             FROM companies c WHERE c.id = ?1",
            COMPANY_COLUMNS
        );
        let summary = self
            .conn
            .query_row(&sql, params![id.value()], summary_from_row)
            .optional()?;
        Ok(summary)
    }

    /// Number of persisted document fingerprints
    pub fn processed_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM document_fingerprints", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CompanySummary> {
    let count: i64 = row.get("initiative_count")?;
    Ok(CompanySummary {
        id: CompanyId::from_value(row.get("id")?),
        company: company_from_row(row)?,
        initiative_count: count as usize,
    })
}

/// Insert or update on the (normalized name, year) key, returning the row id
fn upsert_company_row(conn: &Connection, company: &Company) -> Result<CompanyId, StoreError> {
    let (name_key, year) = company.profile.natural_key();
    let dims = company.dimensions;

    let id: i64 = conn.query_row(
        "INSERT INTO companies (name, name_key, report_year, sector, digital_maturity_level,
             strategic_priority, customer_experience_score, people_empowerment_score,
             operational_efficiency_score, new_business_models_score, has_no_valid_initiatives, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(name_key, report_year) DO UPDATE SET
             name = excluded.name,
             sector = excluded.sector,
             digital_maturity_level = excluded.digital_maturity_level,
             strategic_priority = excluded.strategic_priority,
             customer_experience_score = excluded.customer_experience_score,
             people_empowerment_score = excluded.people_empowerment_score,
             operational_efficiency_score = excluded.operational_efficiency_score,
             new_business_models_score = excluded.new_business_models_score,
             has_no_valid_initiatives = excluded.has_no_valid_initiatives,
             updated_at = excluded.updated_at
         RETURNING id",
        params![
            company.profile.name.trim(),
            name_key,
            year,
            company.profile.sector.as_str(),
            company.profile.maturity.as_str(),
            company.profile.strategic_priority.as_str(),
            dims.customer_experience,
            dims.people_empowerment,
            dims.operational_efficiency,
            dims.new_business_models,
            company.has_no_valid_initiatives,
            now_secs() as i64,
        ],
        |row| row.get(0),
    )?;
    Ok(CompanyId::from_value(id))
}

/// Replace the initiatives stored under `fingerprint`; returns how many were replaced
fn replace_initiative_rows(
    conn: &Connection,
    company_id: CompanyId,
    fingerprint: &DocumentFingerprint,
    initiatives: &[Initiative],
) -> Result<usize, StoreError> {
    let replaced = conn.execute(
        "DELETE FROM initiatives WHERE document_fingerprint = ?1",
        params![fingerprint.as_str()],
    )?;

    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO initiatives (company_id, document_fingerprint, position, {})
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32)",
        INITIATIVE_COLUMNS
    ))?;

    for (position, initiative) in initiatives.iter().enumerate() {
        let fields = &initiative.fields;
        let scoring = &initiative.scoring;
        stmt.execute(params![
            company_id.value(),
            fingerprint.as_str(),
            position as i64,
            fields.description,
            fields.category.as_str(),
            fields.dimensions.customer_experience,
            fields.dimensions.people_empowerment,
            fields.dimensions.operational_efficiency,
            fields.dimensions.new_business_models,
            scoring.stakeholder.investor,
            scoring.stakeholder.policy,
            scoring.stakeholder.strategic,
            fields.disclosure.investment,
            fields.disclosure.timeline,
            fields.disclosure.metrics,
            fields.disclosure.technical,
            fields.disclosure.rationale,
            scoring.disclosure_aggregate,
            scoring.disclosure_tier.as_str(),
            scoring.confidence.as_str(),
            scoring.total_plct,
            scoring.dominant_dimension.as_str(),
            scoring.flagged_for_verification,
            encode_list(&fields.details.technology_used)?,
            encode_list(&fields.details.department)?,
            encode_entries(&fields.details.timeline)?,
            encode_entries(&fields.details.success_metrics)?,
            fields.innovation_level.as_str(),
            fields.expected_impact,
            fields.investment_amount,
            fields.business_rationale,
            fields.reported_confidence,
        ])?;
    }
    Ok(replaced)
}

/// Recompute a company's aggregate dimensions from every initiative it owns
///
/// Keeps the aggregate consistent when more than one document (or a rerun)
/// contributes initiatives to the same company-year.
fn refresh_company_aggregate(conn: &Connection, company_id: CompanyId) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE companies SET
             customer_experience_score = COALESCE(
                 (SELECT AVG(customer_experience_score) FROM initiatives WHERE company_id = ?1), 0),
             people_empowerment_score = COALESCE(
                 (SELECT AVG(people_empowerment_score) FROM initiatives WHERE company_id = ?1), 0),
             operational_efficiency_score = COALESCE(
                 (SELECT AVG(operational_efficiency_score) FROM initiatives WHERE company_id = ?1), 0),
             new_business_models_score = COALESCE(
                 (SELECT AVG(new_business_models_score) FROM initiatives WHERE company_id = ?1), 0),
             has_no_valid_initiatives = NOT EXISTS (SELECT 1 FROM initiatives WHERE company_id = ?1)
         WHERE id = ?1",
        params![company_id.value()],
    )?;
    Ok(())
}

impl PersistenceGateway for SqliteStore {
    type Error = StoreError;

    fn upsert_company(&mut self, company: &Company) -> Result<CompanyId, Self::Error> {
        upsert_company_row(&self.conn, company)
    }

    fn insert_initiatives(
        &mut self,
        company_id: CompanyId,
        fingerprint: &DocumentFingerprint,
        initiatives: &[Initiative],
    ) -> Result<usize, Self::Error> {
        let tx = self.conn.transaction()?;
        replace_initiative_rows(&tx, company_id, fingerprint, initiatives)?;
        refresh_company_aggregate(&tx, company_id)?;
        tx.commit()?;
        Ok(initiatives.len())
    }

    fn persist_document(
        &mut self,
        document_id: &str,
        fingerprint: &DocumentFingerprint,
        company: &Company,
        initiatives: &[Initiative],
    ) -> Result<PersistReceipt, Self::Error> {
        let tx = self.conn.transaction()?;

        let previous_owner: Option<i64> = tx
            .query_row(
                "SELECT company_id FROM document_fingerprints WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let company_id = upsert_company_row(&tx, company)?;
        let initiatives_replaced = replace_initiative_rows(&tx, company_id, fingerprint, initiatives)?;
        refresh_company_aggregate(&tx, company_id)?;
        // A rerun may attribute the document to a differently named company
        if let Some(previous) = previous_owner.filter(|id| *id != company_id.value()) {
            refresh_company_aggregate(&tx, CompanyId::from_value(previous))?;
        }
        tx.execute(
            "INSERT INTO document_fingerprints (fingerprint, document_id, company_id, initiative_count, processed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(fingerprint) DO UPDATE SET
                 document_id = excluded.document_id,
                 company_id = excluded.company_id,
                 initiative_count = excluded.initiative_count,
                 processed_at = excluded.processed_at",
            params![
                fingerprint.as_str(),
                document_id,
                company_id.value(),
                initiatives.len() as i64,
                now_secs() as i64,
            ],
        )?;

        // Dropping the transaction without commit rolls everything back
        tx.commit()?;

        info!(
            document = document_id,
            company = %company.name(),
            company_id = company_id.value(),
            written = initiatives.len(),
            replaced = initiatives_replaced,
            "Persisted document"
        );
        Ok(PersistReceipt {
            company_id,
            initiatives_written: initiatives.len(),
            initiatives_replaced,
        })
    }

    fn is_processed(&self, fingerprint: &DocumentFingerprint) -> Result<bool, Self::Error> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM document_fingerprints WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }
}

impl RecordReader for SqliteStore {
    type Error = StoreError;

    fn snapshot(&self, filter: &SnapshotFilter) -> Result<Snapshot, Self::Error> {
        let mut sql = format!(
            "SELECT {}, COUNT(i.id) AS initiative_count
             FROM companies c LEFT JOIN initiatives i ON i.company_id = c.id
             WHERE 1=1",
            COMPANY_COLUMNS
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(sector) = filter.sector {
            sql.push_str(" AND c.sector = ?");
            params.push(Box::new(sector.as_str()));
        }

        if let Some(year) = filter.report_year {
            sql.push_str(" AND c.report_year = ?");
            params.push(Box::new(year));
        }

        if !filter.include_flagged {
            sql.push_str(" AND c.has_no_valid_initiatives = 0");
        }

        sql.push_str(" GROUP BY c.id ORDER BY c.name_key, c.report_year");

        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let taken_at_secs = now_secs();
        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let companies = stmt
            .query_map(&param_refs[..], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Snapshot {
            taken_at_secs,
            companies,
        })
    }

    fn initiatives_for(&self, company_id: CompanyId) -> Result<Vec<Initiative>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM initiatives WHERE company_id = ?1 ORDER BY id",
            INITIATIVE_COLUMNS
        ))?;
        let initiatives = stmt
            .query_map(params![company_id.value()], initiative_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(initiatives)
    }
}
