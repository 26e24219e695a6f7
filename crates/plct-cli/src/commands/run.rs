//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::{AppConfig, Provider};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use plct_domain::traits::ReasoningEngine;
use plct_llm::{GeminiEngine, OllamaEngine};
use plct_pipeline::{BatchRunner, CancellationToken, DocumentPipeline, PipelineError, RunStatus};
use plct_store::SqliteStore;
use std::path::Path;
use tracing::{info, warn};

const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// Process exit code for a finished batch.
///
/// Partial success still exits 0; the report carries the warning.
pub fn exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Success | RunStatus::PartialSuccess => 0,
        RunStatus::Failed => 2,
    }
}

/// Execute the run command.
pub async fn execute_run(args: RunArgs, mut config: AppConfig, formatter: &Formatter) -> Result<RunStatus> {
    apply_overrides(&args, &mut config);
    config.validate()?;

    // The store comes first: without it no document can be persisted
    let store = SqliteStore::open(&config.store).map_err(|e| PipelineError::store_unavailable(e.to_string()))?;
    info!(db = %config.store.path.display(), "Opened record store");

    match config.engine.provider {
        Provider::Gemini => {
            let engine = gemini_engine(args.api_key.as_deref(), &config)?;
            run_batch(engine, store, &config, &args.dir, formatter).await
        }
        Provider::Ollama => {
            let engine = ollama_engine(&config)?;
            run_batch(engine, store, &config, &args.dir, formatter).await
        }
    }
}

fn apply_overrides(args: &RunArgs, config: &mut AppConfig) {
    if let Some(db) = &args.db {
        config.store.path = db.clone();
    }
    if let Some(workers) = args.workers {
        config.pipeline.workers = workers;
    }
    if let Some(provider) = args.provider {
        config.engine.provider = provider;
    }
    if let Some(model) = &args.model {
        config.engine.model = Some(model.clone());
    }
    if args.reprocess {
        config.pipeline.skip_processed = false;
    }
    if let Some(grace) = args.grace_secs {
        config.pipeline.grace_period_secs = grace;
    }
}

fn gemini_engine(api_key: Option<&str>, config: &AppConfig) -> Result<GeminiEngine> {
    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| CliError::Config("Gemini needs an API key: pass --api-key or set GOOGLE_API_KEY".into()))?;

    let mut engine = GeminiEngine::new(api_key)?
        .with_temperature(config.engine.temperature)
        .with_timeout(config.extractor.request_timeout())?;
    if let Some(model) = &config.engine.model {
        engine = engine.with_model(model.clone());
    }
    if let Some(endpoint) = &config.engine.endpoint {
        engine = engine.with_endpoint(endpoint.clone());
    }
    Ok(engine)
}

fn ollama_engine(config: &AppConfig) -> Result<OllamaEngine> {
    let endpoint = config
        .engine
        .endpoint
        .clone()
        .unwrap_or_else(|| plct_llm::ollama::DEFAULT_ENDPOINT.to_string());
    let model = config
        .engine
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
    Ok(OllamaEngine::with_timeout(endpoint, model, config.extractor.request_timeout())?)
}

async fn run_batch<E>(
    engine: E,
    store: SqliteStore,
    config: &AppConfig,
    dir: &Path,
    formatter: &Formatter,
) -> Result<RunStatus>
where
    E: ReasoningEngine + 'static,
{
    let pipeline = DocumentPipeline::new(engine, store, config.pipeline_settings())?;
    pipeline.preflight().await?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; no new documents will start");
            interrupt.cancel();
        }
    });

    let runner = BatchRunner::new(pipeline);
    let report = runner.run_dir(dir, cancel).await?;

    println!("{}", formatter.format_report(&report)?);
    match report.status {
        RunStatus::PartialSuccess => eprintln!(
            "{}",
            formatter.warning(&format!("{} of {} documents not processed", report.failed(), report.total))
        ),
        RunStatus::Failed => eprintln!("{}", formatter.error("No document was processed")),
        RunStatus::Success => {}
    }
    Ok(report.status)
}
