//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Company, CompanyId, DocumentFingerprint, Initiative, Snapshot, SnapshotFilter};
use std::fmt;
use std::future::Future;

/// Failure status reported by a reasoning engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFailure {
    /// The call did not complete in time
    Timeout,
    /// The engine asked us to slow down
    RateLimited {
        /// Server-suggested wait, if any
        retry_after_secs: Option<u64>,
    },
    /// The response was not a usable JSON object
    Malformed(String),
    /// Credentials were rejected
    Unauthorized(String),
    /// Network failure or server-side error
    Unavailable(String),
}

impl EngineFailure {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        !matches!(self, EngineFailure::Unauthorized(_))
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineFailure::Timeout => write!(f, "timeout"),
            EngineFailure::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "rate limited (retry after {}s)", secs),
            EngineFailure::RateLimited { retry_after_secs: None } => write!(f, "rate limited"),
            EngineFailure::Malformed(msg) => write!(f, "malformed response: {}", msg),
            EngineFailure::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            EngineFailure::Unavailable(msg) => write!(f, "unavailable: {}", msg),
        }
    }
}

impl std::error::Error for EngineFailure {}

/// Remote reasoning engine capable of structured generation
///
/// Implemented by the infrastructure layer (plct-llm). One request carries a
/// whole document plus the schema description; one response is the raw
/// text the engine produced.
pub trait ReasoningEngine: Send + Sync {
    /// Generate a response that should be a single JSON object
    fn generate_structured(
        &self,
        prompt: &str,
        schema: &str,
    ) -> impl Future<Output = Result<String, EngineFailure>> + Send;

    /// Verify credentials and reachability before a run starts
    fn preflight(&self) -> impl Future<Output = Result<(), EngineFailure>> + Send {
        async { Ok(()) }
    }

    /// Model identifier, for logs and reports
    fn model_name(&self) -> &str;
}

/// Outcome of persisting one document's records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistReceipt {
    /// Id of the upserted company
    pub company_id: CompanyId,
    /// Initiatives written
    pub initiatives_written: usize,
    /// Initiatives from an earlier run of the same document that were replaced
    pub initiatives_replaced: usize,
}

/// Sink for finalized Company/Initiative records
///
/// Implemented by the infrastructure layer (plct-store).
pub trait PersistenceGateway {
    /// Error type for store operations
    type Error;

    /// Insert or update a company keyed on (name, report_year)
    fn upsert_company(&mut self, company: &Company) -> Result<CompanyId, Self::Error>;

    /// Attach initiatives to a company under a document fingerprint
    ///
    /// Initiatives previously stored under the same fingerprint are replaced.
    /// Returns the number written. The document is not marked processed;
    /// only [`persist_document`](Self::persist_document) records that.
    fn insert_initiatives(
        &mut self,
        company_id: CompanyId,
        fingerprint: &DocumentFingerprint,
        initiatives: &[Initiative],
    ) -> Result<usize, Self::Error>;

    /// Persist one document's company and initiatives as a single transaction
    fn persist_document(
        &mut self,
        document_id: &str,
        fingerprint: &DocumentFingerprint,
        company: &Company,
        initiatives: &[Initiative],
    ) -> Result<PersistReceipt, Self::Error>;

    /// Whether a document with this fingerprint was already persisted
    fn is_processed(&self, fingerprint: &DocumentFingerprint) -> Result<bool, Self::Error>;
}

/// Read-only access for analytics consumers
pub trait RecordReader {
    /// Error type for read operations
    type Error;

    /// Take a snapshot of persisted companies
    fn snapshot(&self, filter: &SnapshotFilter) -> Result<Snapshot, Self::Error>;

    /// Initiatives of one company in insertion order
    fn initiatives_for(&self, company_id: CompanyId) -> Result<Vec<Initiative>, Self::Error>;
}
