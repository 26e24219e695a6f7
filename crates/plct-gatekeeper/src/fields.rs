//! Field-level coercion helpers
//!
//! Each helper reads one JSON value, coerces it to the declared type and
//! records what it had to change in a [`Findings`] list.

use plct_domain::scores::{SCORE_MAX, SCORE_MIN};
use plct_domain::{DetailEntry, Violation, ViolationKind};
use serde_json::Value;
use tracing::{debug, warn};

/// Violations collected while validating one record
#[derive(Debug, Default)]
pub(crate) struct Findings {
    pub violations: Vec<Violation>,
}

impl Findings {
    pub fn recoverable(&mut self, path: &str, kind: ViolationKind) {
        let violation = Violation::recoverable(path, kind);
        warn!("{}", violation);
        self.violations.push(violation);
    }

    pub fn terminal(&mut self, path: &str, kind: ViolationKind) {
        let violation = Violation::terminal(path, kind);
        debug!("{}", violation);
        self.violations.push(violation);
    }

    pub fn has_terminal(&self) -> bool {
        self.violations.iter().any(|v| v.terminal)
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Read a finite number, optionally from a numeric string ("85", "85%")
pub(crate) fn number(value: &Value, coerce_strings: bool) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if coerce_strings => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Clamp to the score range, recording one violation when clamping occurs
pub(crate) fn clamp_score(path: &str, raw: f64, findings: &mut Findings) -> f64 {
    let clamped = raw.clamp(SCORE_MIN, SCORE_MAX);
    if clamped != raw {
        findings.recoverable(
            path,
            ViolationKind::OutOfRange {
                value: raw,
                clamped_to: clamped,
            },
        );
    }
    clamped
}

/// A score that must be present; `None` means the record is rejected
pub(crate) fn required_score(
    path: &str,
    value: Option<&Value>,
    coerce_strings: bool,
    findings: &mut Findings,
) -> Option<f64> {
    if is_absent(value) {
        findings.terminal(path, ViolationKind::Missing);
        return None;
    }
    match value.and_then(|v| number(v, coerce_strings)) {
        Some(raw) => Some(clamp_score(path, raw, findings)),
        None => {
            findings.terminal(path, ViolationKind::InvalidType { expected: "number 0-100" });
            None
        }
    }
}

/// A score that defaults to 0 when absent or unusable
pub(crate) fn optional_score(
    path: &str,
    value: Option<&Value>,
    coerce_strings: bool,
    findings: &mut Findings,
) -> f64 {
    if is_absent(value) {
        findings.recoverable(path, ViolationKind::Missing);
        return 0.0;
    }
    match value.and_then(|v| number(v, coerce_strings)) {
        Some(raw) => clamp_score(path, raw, findings),
        None => {
            findings.recoverable(path, ViolationKind::InvalidType { expected: "number 0-100" });
            0.0
        }
    }
}

/// A closed-set label; unknown labels fall back to the sentinel
pub(crate) fn enum_field<T>(
    path: &str,
    value: Option<&Value>,
    parse: fn(&str) -> Option<T>,
    unclassified: T,
    findings: &mut Findings,
) -> T {
    match value {
        None | Some(Value::Null) => unclassified,
        Some(Value::String(label)) => match parse(label) {
            Some(parsed) => parsed,
            None => {
                findings.recoverable(
                    path,
                    ViolationKind::UnknownEnumValue {
                        value: label.clone(),
                    },
                );
                unclassified
            }
        },
        Some(_) => {
            findings.recoverable(path, ViolationKind::InvalidType { expected: "string" });
            unclassified
        }
    }
}

/// Optional free text
pub(crate) fn text(path: &str, value: Option<&Value>, findings: &mut Findings) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => scalar_text(v),
        Some(_) => {
            findings.recoverable(path, ViolationKind::InvalidType { expected: "string" });
            None
        }
    }
}

/// Scalars as trimmed text; arrays joined; objects as compact JSON
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn looks_like_json(s: &str) -> bool {
    s.starts_with('{') || s.starts_with('[')
}

fn malformed(path: &str, detail: impl Into<String>, findings: &mut Findings) {
    findings.recoverable(
        path,
        ViolationKind::MalformedNested {
            detail: detail.into(),
        },
    );
}

/// A list of strings; also accepts a JSON-encoded list or a comma-separated string
pub(crate) fn text_list(path: &str, value: Option<&Value>, findings: &mut Findings) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if looks_like_json(s) {
                match serde_json::from_str::<Value>(s) {
                    Ok(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
                    Ok(_) => {
                        malformed(path, "expected a list", findings);
                        Vec::new()
                    }
                    Err(e) => {
                        malformed(path, e.to_string(), findings);
                        Vec::new()
                    }
                }
            } else {
                s.split([',', ';'])
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            }
        }
        Some(_) => {
            malformed(path, "expected a list", findings);
            Vec::new()
        }
    }
}

/// A small object or list; also accepts either encoded as a JSON string
pub(crate) fn detail(path: &str, value: Option<&Value>, findings: &mut Findings) -> Vec<DetailEntry> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Vec::new()
            } else if looks_like_json(s) {
                match serde_json::from_str::<Value>(s) {
                    Ok(parsed @ (Value::Object(_) | Value::Array(_))) => detail_entries(&parsed),
                    Ok(_) => {
                        malformed(path, "expected an object or list", findings);
                        Vec::new()
                    }
                    Err(e) => {
                        malformed(path, e.to_string(), findings);
                        Vec::new()
                    }
                }
            } else {
                vec![DetailEntry::item(s)]
            }
        }
        Some(v @ (Value::Object(_) | Value::Array(_))) => detail_entries(v),
        Some(_) => {
            malformed(path, "expected an object or list", findings);
            Vec::new()
        }
    }
}

fn detail_entries(value: &Value) -> Vec<DetailEntry> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(label, v)| scalar_text(v).map(|text| DetailEntry::pair(label.clone(), text)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::Object(_) => detail_entries(item),
                other => scalar_text(other).map(DetailEntry::item).into_iter().collect(),
            })
            .collect(),
        other => scalar_text(other).map(DetailEntry::item).into_iter().collect(),
    }
}
