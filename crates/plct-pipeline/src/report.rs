//! Per-document outcomes and the batch report

use serde::Serialize;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Why a document was not persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// File unreadable or not a PDF
    Io,
    /// Too little usable text
    EmptyContent,
    /// Engine attempts exhausted
    Extraction,
    /// Required fields missing or invalid
    Validation,
    /// Transaction rolled back
    Persistence,
    /// Cancelled before or during extraction
    NotProcessed,
}

impl FailureKind {
    /// Whether a future run may succeed on the same file
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureKind::Io | FailureKind::EmptyContent)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Io => "io",
            FailureKind::EmptyContent => "skipped-empty",
            FailureKind::Extraction => "extraction-failed",
            FailureKind::Validation => "validation-rejected",
            FailureKind::Persistence => "persistence-failed",
            FailureKind::NotProcessed => "not-processed",
        };
        f.write_str(label)
    }
}

/// What was persisted for a processed document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedSummary {
    /// Company name
    pub company: String,
    /// Report year
    pub report_year: u16,
    /// Storage id of the company
    pub company_id: i64,
    /// Initiatives written
    pub initiatives: usize,
    /// Initiatives rejected by validation
    pub rejected: usize,
    /// Initiatives dropped as duplicates
    pub duplicates_dropped: usize,
    /// Initiatives from an earlier run that were replaced
    pub replaced: usize,
    /// Non-terminal validation findings
    pub violations: usize,
    /// Company has no valid initiatives
    pub flagged: bool,
    /// Engine attempts used
    pub attempts: u32,
}

/// Outcome of one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// Company and initiatives persisted
    Processed(ProcessedSummary),
    /// Fingerprint already stored; engine not called
    AlreadyProcessed,
    /// Document skipped
    Failed {
        /// Failure class
        kind: FailureKind,
        /// Human-readable reason
        reason: String,
    },
}

/// One line of the batch report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    /// File name
    pub document: String,
    /// Content fingerprint, once the file was read
    pub fingerprint: Option<String>,
    /// Outcome
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
    /// Wall-clock time spent on the document
    pub elapsed_ms: u64,
}

impl DocumentReport {
    /// Report for a document given its path
    pub fn new(path: &Path, fingerprint: Option<String>, outcome: DocumentOutcome) -> Self {
        Self {
            document: document_identifier(path),
            fingerprint,
            outcome,
            elapsed_ms: 0,
        }
    }

    /// Failed document
    pub fn failed(path: &Path, fingerprint: Option<String>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::new(
            path,
            fingerprint,
            DocumentOutcome::Failed {
                kind,
                reason: reason.into(),
            },
        )
    }

    /// Document left for a future run
    pub fn not_processed(path: &Path, reason: impl Into<String>) -> Self {
        Self::failed(path, None, FailureKind::NotProcessed, reason)
    }

    /// Set the elapsed time
    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Whether the document counts as a success
    pub fn succeeded(&self) -> bool {
        matches!(
            self.outcome,
            DocumentOutcome::Processed(_) | DocumentOutcome::AlreadyProcessed
        )
    }
}

/// File name used to identify a document
pub fn document_identifier(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A failed document in the batch report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentFailure {
    /// File name
    pub document: String,
    /// Failure class
    pub kind: FailureKind,
    /// Human-readable reason
    pub reason: String,
    /// Whether a future run may succeed
    pub retryable: bool,
}

/// Overall result of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every document processed or already processed
    Success,
    /// Some documents succeeded and some did not
    PartialSuccess,
    /// No document succeeded (including an empty input)
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::PartialSuccess => write!(f, "partial success"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Counts and outcomes of one batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Run identifier (UUIDv7)
    pub run_id: Uuid,
    /// Overall status
    pub status: RunStatus,
    /// Documents seen
    pub total: usize,
    /// Documents persisted in this run
    pub processed: usize,
    /// Documents skipped because their fingerprint was stored
    pub already_processed: usize,
    /// Documents with too little text
    pub skipped_empty: usize,
    /// Unreadable or invalid files
    pub io_failed: usize,
    /// Engine attempts exhausted
    pub extraction_failed: usize,
    /// Payload rejected by validation
    pub validation_rejected: usize,
    /// Transaction rolled back
    pub persistence_failed: usize,
    /// Cancelled documents
    pub not_processed: usize,
    /// Processed companies flagged as having no valid initiatives
    pub companies_without_initiatives: usize,
    /// Initiatives written
    pub initiatives_persisted: usize,
    /// Initiatives rejected by validation
    pub initiatives_rejected: usize,
    /// Initiatives dropped as duplicates
    pub duplicates_dropped: usize,
    /// Total runtime in milliseconds
    pub elapsed_ms: u64,
    /// Failed documents with reasons
    pub failures: Vec<DocumentFailure>,
    /// Every document, in input order
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    /// Create an empty report
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            status: RunStatus::Failed,
            total: 0,
            processed: 0,
            already_processed: 0,
            skipped_empty: 0,
            io_failed: 0,
            extraction_failed: 0,
            validation_rejected: 0,
            persistence_failed: 0,
            not_processed: 0,
            companies_without_initiatives: 0,
            initiatives_persisted: 0,
            initiatives_rejected: 0,
            duplicates_dropped: 0,
            elapsed_ms: 0,
            failures: Vec::new(),
            documents: Vec::new(),
        }
    }

    /// Record one document outcome
    pub fn record(&mut self, report: DocumentReport) {
        self.total += 1;
        match &report.outcome {
            DocumentOutcome::Processed(summary) => {
                self.processed += 1;
                self.initiatives_persisted += summary.initiatives;
                self.initiatives_rejected += summary.rejected;
                self.duplicates_dropped += summary.duplicates_dropped;
                if summary.flagged {
                    self.companies_without_initiatives += 1;
                }
            }
            DocumentOutcome::AlreadyProcessed => self.already_processed += 1,
            DocumentOutcome::Failed { kind, reason } => {
                *self.counter(*kind) += 1;
                self.failures.push(DocumentFailure {
                    document: report.document.clone(),
                    kind: *kind,
                    reason: reason.clone(),
                    retryable: kind.is_retryable(),
                });
            }
        }
        self.documents.push(report);
        self.status = self.compute_status();
    }

    fn counter(&mut self, kind: FailureKind) -> &mut usize {
        match kind {
            FailureKind::Io => &mut self.io_failed,
            FailureKind::EmptyContent => &mut self.skipped_empty,
            FailureKind::Extraction => &mut self.extraction_failed,
            FailureKind::Validation => &mut self.validation_rejected,
            FailureKind::Persistence => &mut self.persistence_failed,
            FailureKind::NotProcessed => &mut self.not_processed,
        }
    }

    /// Documents that were processed or already processed
    pub fn succeeded(&self) -> usize {
        self.processed + self.already_processed
    }

    /// Documents that failed or were skipped
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    fn compute_status(&self) -> RunStatus {
        match (self.succeeded(), self.failed()) {
            (0, _) => RunStatus::Failed,
            (_, 0) => RunStatus::Success,
            _ => RunStatus::PartialSuccess,
        }
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Batch {} ({})", self.run_id, self.status),
            "======================".to_string(),
            format!("Documents: {}", self.total),
            format!("  Processed: {}", self.processed),
            format!("  Already processed: {}", self.already_processed),
        ];

        let skipped = [
            ("Skipped (empty)", self.skipped_empty),
            ("Unreadable", self.io_failed),
            ("Extraction failed", self.extraction_failed),
            ("Validation rejected", self.validation_rejected),
            ("Persistence failed", self.persistence_failed),
            ("Not processed", self.not_processed),
        ];
        for (label, count) in skipped.iter().filter(|(_, count)| *count > 0) {
            lines.push(format!("  {}: {}", label, count));
        }

        lines.push(String::new());
        lines.push(format!("Initiatives persisted: {}", self.initiatives_persisted));
        if self.initiatives_rejected > 0 {
            lines.push(format!("Initiatives rejected: {}", self.initiatives_rejected));
        }
        if self.duplicates_dropped > 0 {
            lines.push(format!("Duplicates dropped: {}", self.duplicates_dropped));
        }
        if self.companies_without_initiatives > 0 {
            lines.push(format!(
                "Companies without valid initiatives: {}",
                self.companies_without_initiatives
            ));
        }
        lines.push(format!("Total runtime: {}ms", self.elapsed_ms));

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failures:".to_string());
            for failure in &self.failures {
                lines.push(format!(
                    "  {} [{}{}]: {}",
                    failure.document,
                    failure.kind,
                    if failure.retryable { ", retryable" } else { "" },
                    failure.reason
                ));
            }
        }

        lines.join("\n")
    }
}
