//! Parse engine output into a raw payload

use crate::types::RawPayload;
use plct_domain::traits::EngineFailure;
use serde_json::Value;

/// Parse an engine response into a single JSON object
///
/// Tolerates markdown code fences and chatter around the JSON. A top-level
/// array yields its first object. Anything else is `Malformed`, which the
/// retry policy treats as transient.
pub fn parse_response(response: &str) -> Result<RawPayload, EngineFailure> {
    let json_str = extract_json(response)?;

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| EngineFailure::Malformed(format!("JSON parse error: {}", e)))?;

    match value {
        Value::Object(_) => Ok(RawPayload::new(value)),
        Value::Array(items) => items
            .into_iter()
            .find(Value::is_object)
            .map(RawPayload::new)
            .ok_or_else(|| EngineFailure::Malformed("array contains no object".to_string())),
        other => Err(EngineFailure::Malformed(format!(
            "expected a JSON object, got {}",
            kind_name(&other)
        ))),
    }
}

/// Locate the JSON text inside a response
fn extract_json(response: &str) -> Result<&str, EngineFailure> {
    let mut trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(EngineFailure::Malformed("empty response".to_string()));
    }

    // Strip a ```json ... ``` wrapper
    if trimmed.starts_with("```") {
        let body = trimmed
            .split_once('\n')
            .map(|(_, rest)| rest)
            .ok_or_else(|| EngineFailure::Malformed("empty code block".to_string()))?;
        trimmed = body.trim_end().trim_end_matches("```").trim();
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    // Leading or trailing chatter: take the outermost bracketed span
    let start = trimmed
        .find(['{', '['])
        .ok_or_else(|| EngineFailure::Malformed("no JSON found in response".to_string()))?;
    let close = if trimmed[start..].starts_with('{') { '}' } else { ']' };
    let end = trimmed
        .rfind(close)
        .filter(|end| *end > start)
        .ok_or_else(|| EngineFailure::Malformed("unterminated JSON in response".to_string()))?;
    Ok(&trimmed[start..=end])
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_object() {
        let payload = parse_response(r#"{"companyName": "Acme", "reportYear": 2023}"#).unwrap();
        assert_eq!(payload.value()["companyName"], "Acme");
    }

    #[test]
    fn test_parse_markdown_wrapper() {
        let response = "```json\n{\"companyName\": \"Acme\"}\n```";
        let payload = parse_response(response).unwrap();
        assert_eq!(payload.value()["companyName"], "Acme");
    }

    #[test]
    fn test_parse_with_chatter() {
        let response = "Here is the analysis:\n{\"companyName\": \"Acme\", \"initiatives\": []}\nLet me know!";
        let payload = parse_response(response).unwrap();
        assert!(payload.value()["initiatives"].is_array());
    }

    #[test]
    fn test_parse_array_takes_first_object() {
        let payload = parse_response(r#"[1, {"companyName": "First"}, {"companyName": "Second"}]"#).unwrap();
        assert_eq!(payload.value()["companyName"], "First");
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(parse_response(""), Err(EngineFailure::Malformed(_))));
        assert!(matches!(parse_response("42"), Err(EngineFailure::Malformed(_))));
        assert!(matches!(parse_response("[]"), Err(EngineFailure::Malformed(_))));
        assert!(matches!(parse_response("This is not JSON"), Err(EngineFailure::Malformed(_))));
    }

    #[test]
    fn test_parse_truncated_json() {
        let response = r#"{"companyName": "Acme", "initiatives": [{"description": "Cloud"#;
        assert!(matches!(parse_response(response), Err(EngineFailure::Malformed(_))));
    }
}
