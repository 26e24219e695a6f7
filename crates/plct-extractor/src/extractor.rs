//! Core StructuredExtractor implementation

use crate::budget::RequestBudget;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::parse_response;
use crate::prompt::PromptBuilder;
use crate::types::{Extraction, RawPayload};
use plct_domain::traits::{EngineFailure, ReasoningEngine};
use plct_domain::SchemaSpec;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Converts document text into a candidate payload through a reasoning engine
///
/// One engine call per attempt; transient failures (timeouts, rate limits,
/// malformed output, unavailability) are retried with exponential backoff
/// up to `max_attempts`. Rejected credentials are never retried.
pub struct StructuredExtractor<E>
where
    E: ReasoningEngine,
{
    engine: Arc<E>,
    budget: Arc<RequestBudget>,
    config: ExtractorConfig,
}

impl<E> StructuredExtractor<E>
where
    E: ReasoningEngine,
{
    /// Create an extractor with its own request budget
    pub fn new(engine: E, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let budget = Arc::new(RequestBudget::new(
            config.requests_per_minute,
            config.max_concurrent_requests,
        ));
        Ok(Self {
            engine: Arc::new(engine),
            budget,
            config,
        })
    }

    /// Share an existing engine and budget (one budget per run)
    pub fn with_shared(
        engine: Arc<E>,
        budget: Arc<RequestBudget>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        Ok(Self {
            engine,
            budget,
            config,
        })
    }

    /// Extractor configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Request budget used by this extractor
    pub fn budget(&self) -> &Arc<RequestBudget> {
        &self.budget
    }

    /// Model name of the underlying engine
    pub fn model_name(&self) -> &str {
        self.engine.model_name()
    }

    /// Extract a raw payload from document text
    ///
    /// # Errors
    ///
    /// - `ExtractorError::Unauthorized` if the engine rejects the credentials
    /// - `ExtractorError::Exhausted` once every attempt has failed
    pub async fn extract(&self, text: &str, schema: &SchemaSpec) -> Result<RawPayload, ExtractorError> {
        self.extract_with_metadata(text, schema)
            .await
            .map(|extraction| extraction.payload)
    }

    /// Extract and report attempts, truncation and elapsed time
    pub async fn extract_with_metadata(
        &self,
        text: &str,
        schema: &SchemaSpec,
    ) -> Result<Extraction, ExtractorError> {
        let started = Instant::now();

        let (text, truncated) = truncate_chars(text, self.config.max_document_chars);
        if truncated {
            warn!(
                max_chars = self.config.max_document_chars,
                "Document text exceeds the request limit; truncating"
            );
        }

        let prompt = PromptBuilder::new(schema, text).build();
        let schema_text = schema.render();
        debug!(prompt_chars = prompt.len(), model = self.engine.model_name(), "Built extraction prompt");

        let max_attempts = self.config.max_attempts;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let failure = match self.attempt(&prompt, &schema_text).await? {
                Ok(payload) => {
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    info!(attempts = attempt, elapsed_ms, "Extraction succeeded");
                    return Ok(Extraction {
                        payload,
                        attempts: attempt,
                        truncated,
                        elapsed_ms,
                    });
                }
                Err(failure) => failure,
            };

            if let EngineFailure::Unauthorized(reason) = &failure {
                return Err(ExtractorError::Unauthorized(reason.clone()));
            }
            if matches!(failure, EngineFailure::RateLimited { .. }) {
                self.budget.on_rate_limited();
            }
            if attempt >= max_attempts {
                warn!(attempts = attempt, reason = %failure, "Extraction attempts exhausted");
                return Err(ExtractorError::Exhausted {
                    attempts: attempt,
                    last: failure,
                });
            }

            let delay = self.retry_delay(attempt, &failure);
            warn!(
                attempt,
                max_attempts,
                reason = %failure,
                delay_ms = delay.as_millis() as u64,
                "Engine call failed; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One budgeted, time-limited engine call
    ///
    /// The outer error is a budget failure; the inner result is the call outcome.
    async fn attempt(
        &self,
        prompt: &str,
        schema_text: &str,
    ) -> Result<Result<RawPayload, EngineFailure>, ExtractorError> {
        let _permit = self.budget.acquire().await?;

        let outcome = match timeout(
            self.config.request_timeout(),
            self.engine.generate_structured(prompt, schema_text),
        )
        .await
        {
            Err(_) => Err(EngineFailure::Timeout),
            Ok(Err(failure)) => Err(failure),
            Ok(Ok(response)) => {
                debug!(response_chars = response.len(), "Engine responded");
                parse_response(&response)
            }
        };
        Ok(outcome)
    }

    fn retry_delay(&self, attempt: u32, failure: &EngineFailure) -> Duration {
        let backoff = self.config.backoff_for(attempt);
        match failure {
            EngineFailure::RateLimited {
                retry_after_secs: Some(secs),
            } => backoff.max(Duration::from_secs(*secs)),
            _ => backoff,
        }
    }
}

/// Cut `text` to at most `max_chars` characters on a character boundary
fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}
