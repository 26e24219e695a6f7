//! PLCT Reasoning Engine Providers
//!
//! Implementations of the `ReasoningEngine` trait from `plct-domain`.
//!
//! # Providers
//!
//! - `MockEngine`: scripted, deterministic engine for tests
//! - `GeminiEngine`: Google Gemini `generateContent` API
//! - `OllamaEngine`: local Ollama API
//!
//! Providers make exactly one HTTP request per call and report failures as
//! [`LlmError`]; the retry policy lives in the extractor.
//!
//! # Examples
//!
//! ```
//! use plct_llm::MockEngine;
//! use plct_domain::traits::{EngineFailure, ReasoningEngine};
//!
//! # async fn example() {
//! let engine = MockEngine::new(r#"{"companyName": "Acme"}"#)
//!     .then_fail(EngineFailure::Timeout);
//!
//! assert!(engine.generate_structured("prompt", "schema").await.is_err());
//! assert!(engine.generate_structured("prompt", "schema").await.is_ok());
//! assert_eq!(engine.call_count(), 2);
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod ollama;

use chrono::{DateTime, Utc};
use plct_domain::traits::{EngineFailure, ReasoningEngine};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use gemini::GeminiEngine;
pub use ollama::OllamaEngine;

/// Errors that can occur during engine calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response could not be used
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded {
        /// Server-suggested wait
        retry_after: Option<Duration>,
    },

    /// Credentials rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Provider misconfigured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Communication(format!("Request failed: {}", e.without_url()))
        }
    }
}

impl From<LlmError> for EngineFailure {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => EngineFailure::Timeout,
            LlmError::RateLimitExceeded { retry_after } => EngineFailure::RateLimited {
                retry_after_secs: retry_after.map(|d| d.as_secs()),
            },
            LlmError::InvalidResponse(msg) => EngineFailure::Malformed(msg),
            LlmError::Unauthorized(msg) => EngineFailure::Unauthorized(msg),
            LlmError::Communication(msg) | LlmError::Config(msg) => EngineFailure::Unavailable(msg),
            LlmError::ModelNotAvailable(model) => {
                EngineFailure::Unavailable(format!("model not available: {}", model))
            }
        }
    }
}

/// Parse a Retry-After header value (seconds or HTTP-date)
///
/// A date that has already passed means no extra wait. Values in neither
/// form yield `None` and the extractor's own backoff applies.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    retry_after_at(value, Utc::now())
}

fn retry_after_at(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let date = DateTime::parse_from_rfc2822(value).ok()?;
    Some((date.with_timezone(&Utc) - now).to_std().unwrap_or(Duration::ZERO))
}

/// One scripted outcome of a [`MockEngine`] call
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return this text
    Respond(String),
    /// Fail with this status
    Fail(EngineFailure),
}

/// Scripted engine for deterministic testing
///
/// Each call pops the next scripted outcome; once the script is exhausted,
/// the default response is returned. Clones share the script, the call
/// counter and the recorded prompts.
#[derive(Debug, Clone)]
pub struct MockEngine {
    default_response: String,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    call_count: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    preflight_failure: Option<EngineFailure>,
    model: String,
}

impl MockEngine {
    /// Create an engine that always returns `response` unless scripted otherwise
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            delay: None,
            preflight_failure: None,
            model: "mock".to_string(),
        }
    }

    /// Queue a failure for the next unscripted call
    pub fn then_fail(self, failure: EngineFailure) -> Self {
        self.push(MockOutcome::Fail(failure));
        self
    }

    /// Queue a response for the next unscripted call
    pub fn then_respond(self, response: impl Into<String>) -> Self {
        self.push(MockOutcome::Respond(response.into()));
        self
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make `preflight` fail with this status
    pub fn with_preflight_failure(mut self, failure: EngineFailure) -> Self {
        self.preflight_failure = Some(failure);
        self
    }

    /// Append an outcome to the script
    pub fn push(&self, outcome: MockOutcome) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Number of `generate_structured` calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_outcome(&self) -> MockOutcome {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Respond(self.default_response.clone()))
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl ReasoningEngine for MockEngine {
    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, EngineFailure> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_outcome() {
            MockOutcome::Respond(text) => Ok(text),
            MockOutcome::Fail(failure) => Err(failure),
        }
    }

    async fn preflight(&self) -> Result<(), EngineFailure> {
        match &self.preflight_failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
