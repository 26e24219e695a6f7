//! One document through load, extract, validate, score, reconcile and persist

use crate::report::{DocumentOutcome, DocumentReport, FailureKind, ProcessedSummary};
use crate::{PipelineConfig, PipelineError, RecordReconciler, ReconcilerConfig};
use plct_domain::traits::{EngineFailure, PersistenceGateway, ReasoningEngine};
use plct_domain::{Document, ScoringConfig, ScoringEngine, SchemaSpec};
use plct_extractor::{ExtractorConfig, ExtractorError, RequestBudget, StructuredExtractor};
use plct_gatekeeper::{SchemaValidator, ValidationConfig};
use plct_ingest::DocumentLoader;
use std::fmt::Display;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Every component configuration a pipeline needs
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    /// Worker pool and resume settings
    pub pipeline: PipelineConfig,
    /// Engine call policy
    pub extractor: ExtractorConfig,
    /// Validation rules
    pub validation: ValidationConfig,
    /// Confidence thresholds
    pub scoring: ScoringConfig,
    /// Dedup and sector overrides
    pub reconciler: ReconcilerConfig,
}

/// Processes single documents end to end
///
/// One instance is shared by every worker of a run. The engine, request
/// budget and store are the only shared state; the store is locked only for
/// the duration of a synchronous call.
pub struct DocumentPipeline<E, S>
where
    E: ReasoningEngine,
{
    engine: Arc<E>,
    loader: DocumentLoader,
    extractor: StructuredExtractor<E>,
    validator: SchemaValidator,
    scorer: ScoringEngine,
    reconciler: RecordReconciler,
    store: Arc<Mutex<S>>,
    schema: SchemaSpec,
    config: PipelineConfig,
}

impl<E, S> DocumentPipeline<E, S>
where
    E: ReasoningEngine,
    S: PersistenceGateway,
    S::Error: Display,
{
    /// Build a pipeline owning its engine and store
    pub fn new(engine: E, store: S, settings: PipelineSettings) -> Result<Self, PipelineError> {
        Self::with_shared(Arc::new(engine), Arc::new(Mutex::new(store)), settings)
    }

    /// Build a pipeline over an engine and store shared with the caller
    pub fn with_shared(
        engine: Arc<E>,
        store: Arc<Mutex<S>>,
        settings: PipelineSettings,
    ) -> Result<Self, PipelineError> {
        let PipelineSettings {
            pipeline,
            extractor,
            validation,
            scoring,
            reconciler,
        } = settings;

        pipeline.validate().map_err(PipelineError::Config)?;
        scoring.validate().map_err(PipelineError::Config)?;

        let budget = Arc::new(RequestBudget::new(
            extractor.requests_per_minute,
            extractor.max_concurrent_requests,
        ));
        let extractor = StructuredExtractor::with_shared(Arc::clone(&engine), budget, extractor)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let validator = SchemaValidator::new(validation).map_err(|e| PipelineError::Config(e.to_string()))?;

        Ok(Self {
            engine,
            loader: DocumentLoader::new(pipeline.loader_config()),
            extractor,
            validator,
            scorer: ScoringEngine::new(scoring),
            reconciler: RecordReconciler::new(reconciler)?,
            store,
            schema: SchemaSpec::plct(),
            config: pipeline,
        })
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The shared store
    pub fn store(&self) -> &Arc<Mutex<S>> {
        &self.store
    }

    /// The request budget shared by all engine calls of this pipeline
    pub fn budget(&self) -> &Arc<RequestBudget> {
        self.extractor.budget()
    }

    /// Check the engine before any document is touched
    ///
    /// Rejected credentials abort the run. Any other failure is logged and
    /// left to the per-document retry policy.
    pub async fn preflight(&self) -> Result<(), PipelineError> {
        match self.engine.preflight().await {
            Ok(()) => {
                info!(model = self.engine.model_name(), "Engine preflight passed");
                Ok(())
            }
            Err(EngineFailure::Unauthorized(reason)) => Err(PipelineError::unauthorized(reason)),
            Err(failure) => {
                warn!(model = self.engine.model_name(), "Engine preflight failed, continuing: {}", failure);
                Ok(())
            }
        }
    }

    /// Process one document
    ///
    /// Every per-document failure is returned as a [`DocumentReport`]; only
    /// rejected engine credentials and an unusable store come back as `Err`.
    /// Once `cancel` fires, a document that has not reached the engine is
    /// not processed, and an in-flight extraction gets the configured grace
    /// period before it is abandoned.
    pub async fn process(&self, path: &Path, cancel: &CancellationToken) -> Result<DocumentReport, PipelineError> {
        let started = Instant::now();
        let report = self
            .process_inner(path, cancel)
            .await?
            .with_elapsed_ms(started.elapsed().as_millis() as u64);

        match &report.outcome {
            DocumentOutcome::Processed(summary) => info!(
                document = %report.document,
                company = %summary.company,
                year = summary.report_year,
                initiatives = summary.initiatives,
                elapsed_ms = report.elapsed_ms,
                "Document processed"
            ),
            DocumentOutcome::AlreadyProcessed => info!(document = %report.document, "Document already processed"),
            DocumentOutcome::Failed { kind, reason } => info!(
                document = %report.document,
                outcome = %kind,
                retryable = kind.is_retryable(),
                "Document skipped: {}",
                reason
            ),
        }
        Ok(report)
    }

    async fn process_inner(&self, path: &Path, cancel: &CancellationToken) -> Result<DocumentReport, PipelineError> {
        if cancel.is_cancelled() {
            return Ok(DocumentReport::not_processed(path, "run cancelled before dispatch"));
        }

        let loader = self.loader.clone();
        let owned = path.to_path_buf();
        let loaded = tokio::task::spawn_blocking(move || loader.load(&owned))
            .await
            .map_err(|e| PipelineError::Worker(format!("Loader task failed: {}", e)))?;

        let document = match loaded {
            Ok(document) => document,
            Err(e) => {
                let kind = if e.is_empty_content() {
                    FailureKind::EmptyContent
                } else {
                    FailureKind::Io
                };
                warn!(document = %path.display(), "{}", e);
                return Ok(DocumentReport::failed(path, None, kind, e.to_string()));
            }
        };
        let fingerprint = Some(document.fingerprint().as_str().to_string());

        if self.config.skip_processed {
            if let Some(report) = self.check_processed(path, &document)? {
                return Ok(report);
            }
        }

        if cancel.is_cancelled() {
            return Ok(DocumentReport::failed(
                path,
                fingerprint,
                FailureKind::NotProcessed,
                "run cancelled before extraction",
            ));
        }

        debug!(
            document = %document.identifier(),
            fingerprint = document.fingerprint().short(),
            pages = document.page_count(),
            "Extracting"
        );

        let extracted = {
            let work = self.extractor.extract_with_metadata(document.text(), &self.schema);
            tokio::pin!(work);
            tokio::select! {
                biased;
                result = &mut work => Some(result),
                _ = cancel.cancelled() => {
                    let grace = self.config.grace_period();
                    info!(
                        document = %document.identifier(),
                        grace_secs = grace.as_secs(),
                        "Cancellation requested; waiting for in-flight extraction"
                    );
                    tokio::time::timeout(grace, &mut work).await.ok()
                }
            }
        };

        let extraction = match extracted {
            None => {
                warn!(document = %document.identifier(), "Grace period expired; extraction abandoned");
                return Ok(DocumentReport::failed(
                    path,
                    fingerprint,
                    FailureKind::NotProcessed,
                    "extraction abandoned after cancellation grace period",
                ));
            }
            Some(Ok(extraction)) => extraction,
            Some(Err(ExtractorError::Unauthorized(reason))) => return Err(PipelineError::unauthorized(reason)),
            Some(Err(ExtractorError::BudgetClosed)) => {
                return Ok(DocumentReport::failed(
                    path,
                    fingerprint,
                    FailureKind::NotProcessed,
                    "request budget closed",
                ));
            }
            Some(Err(e)) => {
                return Ok(DocumentReport::failed(path, fingerprint, FailureKind::Extraction, e.to_string()));
            }
        };

        let validated = match self.validator.validate(&extraction.payload) {
            Ok(validated) => validated,
            Err(violations) => {
                let reason = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!(document = %document.identifier(), violations = %reason, "Payload rejected");
                return Ok(DocumentReport::failed(path, fingerprint, FailureKind::Validation, reason));
            }
        };

        let rejected = validated.rejected.len();
        let violations = validated.violations.len();
        let scored = self.scorer.score(&validated);
        let reconciled = self.reconciler.reconcile(&document, scored);

        let persisted = {
            let mut store = self.lock_store()?;
            store.persist_document(
                document.identifier(),
                document.fingerprint(),
                &reconciled.company,
                &reconciled.initiatives,
            )
        };
        let receipt = match persisted {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(document = %document.identifier(), "Persistence rolled back: {}", e);
                return Ok(DocumentReport::failed(path, fingerprint, FailureKind::Persistence, e.to_string()));
            }
        };

        Ok(DocumentReport::new(
            path,
            fingerprint,
            DocumentOutcome::Processed(ProcessedSummary {
                company: reconciled.company.name().to_string(),
                report_year: reconciled.company.report_year(),
                company_id: receipt.company_id.value(),
                initiatives: receipt.initiatives_written,
                rejected,
                duplicates_dropped: reconciled.duplicates_dropped,
                replaced: receipt.initiatives_replaced,
                violations,
                flagged: reconciled.company.has_no_valid_initiatives,
                attempts: extraction.attempts,
            }),
        ))
    }

    /// Report for a document whose fingerprint is already stored
    fn check_processed(&self, path: &Path, document: &Document) -> Result<Option<DocumentReport>, PipelineError> {
        let fingerprint = Some(document.fingerprint().as_str().to_string());
        let seen = self.lock_store()?.is_processed(document.fingerprint());
        match seen {
            Ok(true) => Ok(Some(DocumentReport::new(
                path,
                fingerprint,
                DocumentOutcome::AlreadyProcessed,
            ))),
            Ok(false) => Ok(None),
            Err(e) => Ok(Some(DocumentReport::failed(
                path,
                fingerprint,
                FailureKind::Persistence,
                format!("fingerprint lookup failed: {}", e),
            ))),
        }
    }

    fn lock_store(&self) -> Result<std::sync::MutexGuard<'_, S>, PipelineError> {
        self.store
            .lock()
            .map_err(|e| PipelineError::store_unavailable(format!("Store lock error: {}", e)))
    }
}
