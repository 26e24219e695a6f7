//! Bounded worker pool for batch runs

use crate::report::{BatchReport, DocumentReport, FailureKind};
use crate::{DocumentPipeline, PipelineError};
use plct_domain::traits::{PersistenceGateway, ReasoningEngine};
use plct_ingest::discover_pdfs;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

type Job = (usize, PathBuf);

/// Runs a batch of documents through a shared [`DocumentPipeline`]
///
/// # Examples
///
/// ```no_run
/// use plct_llm::MockEngine;
/// use plct_pipeline::{BatchRunner, CancellationToken, DocumentPipeline, PipelineSettings};
/// use plct_store::SqliteStore;
/// use std::path::Path;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let engine = MockEngine::new("{}");
///     let store = SqliteStore::new("plct.db")?;
///     let pipeline = DocumentPipeline::new(engine, store, PipelineSettings::default())?;
///     let runner = BatchRunner::new(pipeline);
///
///     let report = runner.run_dir(Path::new("reports"), CancellationToken::new()).await?;
///     println!("{}", report.summary());
///     Ok(())
/// }
/// ```
pub struct BatchRunner<E, S>
where
    E: ReasoningEngine,
{
    pipeline: Arc<DocumentPipeline<E, S>>,
}

impl<E, S> BatchRunner<E, S>
where
    E: ReasoningEngine + 'static,
    S: PersistenceGateway + Send + 'static,
    S::Error: Display,
{
    /// Create a runner over a pipeline
    pub fn new(pipeline: DocumentPipeline<E, S>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// The pipeline shared by the workers
    pub fn pipeline(&self) -> &DocumentPipeline<E, S> {
        &self.pipeline
    }

    /// Process every `*.pdf` directly inside `dir`
    ///
    /// An empty directory yields a report with status `Failed`.
    ///
    /// # Errors
    ///
    /// - `PipelineError::Discovery` if the directory cannot be listed
    /// - `PipelineError::Fatal` on rejected credentials or an unusable store
    pub async fn run_dir(&self, dir: &Path, cancel: CancellationToken) -> Result<BatchReport, PipelineError> {
        let paths = discover_pdfs(dir)?;
        if paths.is_empty() {
            warn!(dir = %dir.display(), "No PDF documents found");
        }
        self.run(paths, cancel).await
    }

    /// Process the given documents with at most `workers` in parallel
    ///
    /// Documents are reported in input order. Once `cancel` fires, queued
    /// documents are reported as not processed. A fatal error cancels the
    /// remaining work and is returned instead of the report.
    pub async fn run(&self, paths: Vec<PathBuf>, cancel: CancellationToken) -> Result<BatchReport, PipelineError> {
        let run_id = Uuid::now_v7();
        let span = info_span!("batch", run_id = %run_id);
        self.run_inner(run_id, paths, cancel).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        paths: Vec<PathBuf>,
        cancel: CancellationToken,
    ) -> Result<BatchReport, PipelineError> {
        let started = Instant::now();
        let mut report = BatchReport::new(run_id);
        let total = paths.len();

        if total == 0 {
            info!("Batch finished: no documents");
            return Ok(report);
        }

        let workers = self.pipeline.config().workers.min(total);
        info!(documents = total, workers, "Starting batch");

        let (job_tx, job_rx) = async_channel::bounded::<Job>(total);
        for job in paths.into_iter().enumerate() {
            job_tx
                .send(job)
                .await
                .map_err(|e| PipelineError::Worker(format!("Job queue closed: {}", e)))?;
        }
        job_tx.close();

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let pipeline = Arc::clone(&self.pipeline);
            let jobs = job_rx.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(
                run_worker(worker_id, pipeline, jobs, cancel).in_current_span(),
            ));
        }

        let mut results = Vec::with_capacity(total);
        let mut fatal = None;
        for handle in handles {
            let outcome = handle
                .await
                .map_err(|e| PipelineError::Worker(format!("Worker task failed: {}", e)))?;
            results.extend(outcome.reports);
            if fatal.is_none() {
                fatal = outcome.fatal;
            }
        }

        if let Some(e) = fatal {
            error!("Batch aborted: {}", e);
            return Err(e);
        }

        results.sort_by_key(|(index, _)| *index);
        for (_, document) in results {
            report.record(document);
        }
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            status = %report.status,
            processed = report.processed,
            failed = report.failed(),
            "Batch finished\n{}",
            report.summary()
        );
        Ok(report)
    }
}

struct WorkerOutcome {
    reports: Vec<(usize, DocumentReport)>,
    fatal: Option<PipelineError>,
}

async fn run_worker<E, S>(
    worker_id: usize,
    pipeline: Arc<DocumentPipeline<E, S>>,
    jobs: async_channel::Receiver<Job>,
    cancel: CancellationToken,
) -> WorkerOutcome
where
    E: ReasoningEngine,
    S: PersistenceGateway,
    S::Error: Display,
{
    let mut outcome = WorkerOutcome {
        reports: Vec::new(),
        fatal: None,
    };

    while let Ok((index, path)) = jobs.recv().await {
        if cancel.is_cancelled() {
            outcome
                .reports
                .push((index, DocumentReport::not_processed(&path, "run cancelled before dispatch")));
            continue;
        }

        match pipeline.process(&path, &cancel).await {
            Ok(document) => outcome.reports.push((index, document)),
            Err(e) if e.is_fatal() => {
                error!(worker = worker_id, document = %path.display(), "{}", e);
                // Stop dispatch and release workers blocked on the budget
                cancel.cancel();
                pipeline.budget().close();
                outcome.reports.push((index, DocumentReport::not_processed(&path, e.to_string())));
                if outcome.fatal.is_none() {
                    outcome.fatal = Some(e);
                }
            }
            Err(e) => {
                warn!(worker = worker_id, document = %path.display(), "{}", e);
                outcome
                    .reports
                    .push((index, DocumentReport::failed(&path, None, FailureKind::NotProcessed, e.to_string())));
            }
        }
    }

    outcome
}
