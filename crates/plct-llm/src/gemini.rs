//! Google Gemini provider
//!
//! Calls the `generateContent` endpoint with `responseMimeType` set to
//! `application/json`. One call is one HTTP request; retries and pacing are
//! the caller's concern.

use crate::{parse_retry_after, LlmError};
use plct_domain::traits::{EngineFailure, ReasoningEngine};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Public Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` engine
pub struct GeminiEngine {
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiEngine {
    /// Create an engine with the default model and endpoint
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Unauthorized` when the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Unauthorized("API key is empty".to_string()));
        }

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
            temperature: 0.1,
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
        })
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a different endpoint (proxies, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the HTTP request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.endpoint, self.model)
    }

    /// Send one `generateContent` request and return the candidate text
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}:generateContent", self.model_url());
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: self.temperature,
            },
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, retry_after, &self.model, &text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        candidate_text(parsed)
    }

    /// Fetch the model's metadata to confirm the key and model are usable
    pub async fn check_model(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(self.model_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, None, &self.model, &text))
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Map a non-success status to an error
///
/// Gemini answers an invalid key with 400 and `API_KEY_INVALID` in the body,
/// so that case is checked before the generic status classes.
fn status_error(status: StatusCode, retry_after: Option<Duration>, model: &str, body: &str) -> LlmError {
    if status == StatusCode::BAD_REQUEST
        && (body.contains("API_KEY_INVALID") || body.contains("API key not valid"))
    {
        return LlmError::Unauthorized("API key not valid".to_string());
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::Unauthorized(format!("HTTP {}", status))
        }
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded { retry_after },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => LlmError::Timeout,
        s if s.is_server_error() => LlmError::Communication(format!("HTTP {}: {}", s, body)),
        s => LlmError::InvalidResponse(format!("HTTP {}: {}", s, body)),
    }
}

fn candidate_text(response: GenerateResponse) -> Result<String, LlmError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(LlmError::InvalidResponse(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("no candidates in response".to_string()))?;

    if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
        return Err(LlmError::InvalidResponse(
            "generation stopped at the token limit".to_string(),
        ));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(LlmError::InvalidResponse(format!(
            "candidate has no text (finish reason {})",
            reason
        )));
    }
    Ok(text)
}

impl ReasoningEngine for GeminiEngine {
    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, EngineFailure> {
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

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(GeminiEngine::new("  "), Err(LlmError::Unauthorized(_))));
    }

    #[test]
    fn test_model_url() {
        let engine = GeminiEngine::new("key")
            .unwrap()
            .with_endpoint("http://localhost:8080/")
            .with_model("gemini-1.5-pro");
        assert_eq!(
            engine.model_url(),
            "http://localhost:8080/v1beta/models/gemini-1.5-pro"
        );
        assert_eq!(engine.model_name(), "gemini-1.5-pro");
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.1,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}, "finishReason": "STOP"}]}"#,
        );
        assert_eq!(candidate_text(response).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_missing_candidate_is_invalid() {
        assert!(matches!(
            candidate_text(parse(r#"{"candidates": []}"#)),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(matches!(
            candidate_text(parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(matches!(
            candidate_text(parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_max_tokens_is_invalid() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}]}, "finishReason": "MAX_TOKENS"}]}"#,
        );
        assert!(matches!(candidate_text(response), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_status_mapping() {
        let m = "gemini-2.0-flash";
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, None, m, ""),
            LlmError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, None, m, ""),
            LlmError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(
                StatusCode::BAD_REQUEST,
                None,
                m,
                r#"{"error": {"status": "INVALID_ARGUMENT", "details": [{"reason": "API_KEY_INVALID"}]}}"#
            ),
            LlmError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some(Duration::from_secs(9)), m, ""),
            LlmError::RateLimitExceeded { retry_after: Some(d) } if d == Duration::from_secs(9)
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, None, m, "overloaded"),
            LlmError::Communication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, None, m, ""),
            LlmError::ModelNotAvailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::GATEWAY_TIMEOUT, None, m, ""),
            LlmError::Timeout
        ));
    }

    #[test]
    fn test_unauthorized_is_permanent_failure() {
        let failure = EngineFailure::from(status_error(StatusCode::UNAUTHORIZED, None, "m", ""));
        assert!(!failure.is_transient());
        let failure = EngineFailure::from(status_error(StatusCode::BAD_GATEWAY, None, "m", ""));
        assert!(failure.is_transient());
    }
}
