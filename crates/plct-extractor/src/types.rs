//! Extraction output types

use serde_json::{Map, Value};

/// Unvalidated engine output: a single JSON object
///
/// Nothing downstream may trust its contents until the validator has
/// produced a `ValidatedPayload` from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload(Value);

impl RawPayload {
    /// Wrap a JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The underlying JSON
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Top-level object, if the payload is one
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    /// Take the JSON value
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A successful extraction with call bookkeeping
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The parsed payload
    pub payload: RawPayload,
    /// Engine calls made, including the successful one
    pub attempts: u32,
    /// Whether the document text was cut to fit the request
    pub truncated: bool,
    /// Wall time spent including backoff (milliseconds)
    pub elapsed_ms: u64,
}
