//! PLCT Pipeline
//!
//! Drives annual-report PDFs through extraction, validation, scoring and
//! reconciliation into the record store.
//!
//! # Overview
//!
//! Each document is processed independently by a [`DocumentPipeline`]:
//!
//! ```text
//! PDF → DocumentLoader → StructuredExtractor → SchemaValidator → ScoringEngine → RecordReconciler → store
//! ```
//!
//! A [`BatchRunner`] feeds documents to a bounded pool of workers that share
//! one pipeline, one request budget and one store. No document failure
//! aborts the batch; every outcome lands in the [`BatchReport`]. Only
//! rejected engine credentials and an unusable store stop the run.
//!
//! | Outcome | Retryable | Meaning |
//! |---------|-----------|---------|
//! | **processed** | - | Company and initiatives persisted in one transaction |
//! | **already processed** | - | Fingerprint stored by an earlier run; engine not called |
//! | **io** | no | File unreadable or not a PDF |
//! | **skipped-empty** | no | Too little text to extract from |
//! | **extraction-failed** | yes | Engine attempts exhausted |
//! | **validation-rejected** | yes | Required fields missing or invalid |
//! | **persistence-failed** | yes | Transaction rolled back |
//! | **not-processed** | yes | Run cancelled before or during extraction |
//!
//! # Usage
//!
//! ```no_run
//! use plct_llm::MockEngine;
//! use plct_pipeline::{BatchRunner, CancellationToken, DocumentPipeline, PipelineSettings, RunStatus};
//! use plct_store::SqliteStore;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::new("plct.db")?;
//!     let engine = MockEngine::new(r#"{"companyName": "Acme", "reportYear": 2023, "initiatives": []}"#);
//!     let pipeline = DocumentPipeline::new(engine, store, PipelineSettings::default())?;
//!     pipeline.preflight().await?;
//!
//!     let runner = BatchRunner::new(pipeline);
//!     let report = runner.run_dir(Path::new("reports"), CancellationToken::new()).await?;
//!     if report.status == RunStatus::Failed {
//!         eprintln!("{}", report.summary());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [pipeline]
//! workers = 3
//! grace_period_secs = 30
//! skip_processed = true
//! min_text_chars = 200
//!
//! [reconciler]
//! dedup = { mode = "fuzzy", threshold = 0.92 }
//!
//! [reconciler.sector_overrides]
//! "Maybank" = "Financial Services"
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
mod pool;
mod reconciler;
mod report;

pub use config::{DedupPolicy, PipelineConfig, ReconcilerConfig};
pub use error::{FatalKind, PipelineError};
pub use pipeline::{DocumentPipeline, PipelineSettings};
pub use pool::BatchRunner;
pub use reconciler::{normalize_text, Reconciled, RecordReconciler};
pub use report::{
    document_identifier, BatchReport, DocumentFailure, DocumentOutcome, DocumentReport, FailureKind,
    ProcessedSummary, RunStatus,
};
pub use tokio_util::sync::CancellationToken;
