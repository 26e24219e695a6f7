//! Ollama Provider Implementation
//!
//! Runs extraction against a local Ollama instance, useful for development
//! without spending API quota. Requests use Ollama's JSON mode so the
//! response is a single JSON document.
//!
//! # Examples
//!
//! ```no_run
//! use plct_llm::OllamaEngine;
//!
//! let engine = OllamaEngine::new("http://localhost:11434", "llama3.1").unwrap();
//! ```

use crate::LlmError;
use plct_domain::traits::{EngineFailure, ReasoningEngine};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default request timeout; local models are slow on whole reports
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Ollama API engine for local inference
pub struct OllamaEngine {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

impl OllamaEngine {
    /// Create a new Ollama engine
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create an engine with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    /// Create an engine against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Endpoint in use
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one generate request in JSON mode
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - The response was cut short or is not a generate response
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            format: "json",
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &self.model, text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        into_text(parsed)
    }

    /// Check that the model is pulled locally
    pub async fn check_model(&self) -> Result<(), LlmError> {
        let url = format!("{}/api/tags", self.endpoint);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &self.model, text));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse tags: {}", e)))?;
        if has_model(&tags, &self.model) {
            Ok(())
        } else {
            Err(LlmError::ModelNotAvailable(self.model.clone()))
        }
    }
}

fn status_error(status: StatusCode, model: &str, body: String) -> LlmError {
    match status {
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded { retry_after: None },
        _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

fn into_text(response: GenerateResponse) -> Result<String, LlmError> {
    if response.done_reason.as_deref() == Some("length") {
        return Err(LlmError::InvalidResponse(
            "generation stopped at the token limit".to_string(),
        ));
    }
    Ok(response.response)
}

// "llama3.1" matches the "llama3.1:latest" tag
fn has_model(tags: &TagsResponse, model: &str) -> bool {
    tags.models.iter().any(|entry| {
        entry.name == model || entry.name.split(':').next() == Some(model)
    })
}

impl ReasoningEngine for OllamaEngine {
    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, EngineFailure> {
        // The schema is already rendered into the prompt; JSON mode does the rest
        self.generate(prompt).await.map_err(EngineFailure::from)
    }

    async fn preflight(&self) -> Result<(), EngineFailure> {
        self.check_model().await.map_err(EngineFailure::from)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_engine_creation() {
        let engine = OllamaEngine::new("http://localhost:11434/", "llama3.1").unwrap();
        assert_eq!(engine.endpoint(), "http://localhost:11434");
        assert_eq!(engine.model_name(), "llama3.1");
    }

    #[test]
    fn test_ollama_default_endpoint() {
        let engine = OllamaEngine::default_endpoint("mistral").unwrap();
        assert_eq!(engine.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_request_uses_json_mode() {
        let body = GenerateRequest {
            model: "llama3.1",
            prompt: "hi",
            format: "json",
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn test_truncated_generation_is_invalid() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"response": "{\"a\":", "done": true, "done_reason": "length"}"#).unwrap();
        assert!(matches!(into_text(parsed), Err(LlmError::InvalidResponse(_))));

        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"response": "{}", "done": true, "done_reason": "stop"}"#).unwrap();
        assert_eq!(into_text(parsed).unwrap(), "{}");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "m", String::new()),
            LlmError::ModelNotAvailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "m", "boom".into()),
            LlmError::Communication(_)
        ));
    }

    #[test]
    fn test_model_tag_matching() {
        let tags: TagsResponse =
            serde_json::from_str(r#"{"models": [{"name": "llama3.1:latest"}, {"name": "mistral:7b"}]}"#).unwrap();
        assert!(has_model(&tags, "llama3.1"));
        assert!(has_model(&tags, "mistral:7b"));
        assert!(!has_model(&tags, "phi3"));
    }
}
