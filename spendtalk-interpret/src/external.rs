//! Seam for a generative-model categorizer.
//!
//! Model output is loosely typed: every field is optional and may arrive as
//! the wrong JSON type (e.g. `"amount": "25k"`). The interpreter coerces each
//! field on its own instead of rejecting the whole answer.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use spendtalk_core::Language;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CategorizerError {
    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: &'static str },

    #[error("{provider} request failed: {message}")]
    Network { provider: &'static str, message: String },

    #[error("{provider} did not answer within {after:?}")]
    Timeout { provider: &'static str, after: Duration },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status { provider: &'static str, status: u16, body: String },

    #[error("{provider} returned no content")]
    EmptyResponse { provider: &'static str },

    #[error("could not parse {provider} output: {message}")]
    Malformed { provider: &'static str, message: String },

    #[error("{provider} cannot run here: {message}")]
    Runtime { provider: &'static str, message: String },
}

/// Raw fields as the model produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalCategorization {
    #[serde(default, rename = "type")]
    pub transaction_type: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub icon: Option<Value>,
}

pub trait ExternalCategorizer: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Categorize one (already voice-normalized) message. Blocking; callers
    /// rely on implementations bounding their own latency.
    fn categorize(
        &self,
        text: &str,
        language: Language,
    ) -> Result<ExternalCategorization, CategorizerError>;
}

/// Pull the JSON object out of a model reply.
///
/// Accepts bare JSON, ```json fenced blocks, prose around the object, and a
/// single-element array wrapping it.
pub fn parse_model_output(
    provider: &'static str,
    raw: &str,
) -> Result<ExternalCategorization, CategorizerError> {
    let malformed = |message: String| CategorizerError::Malformed { provider, message };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CategorizerError::EmptyResponse { provider });
    }

    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    let body = match (start, end) {
        (Some(s), Some(e)) if e > s => &trimmed[s..=e],
        _ => return Err(malformed(format!("no JSON object in {:?}", preview(trimmed)))),
    };

    let value: Value = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    let object = match value {
        Value::Object(_) => value,
        Value::Array(mut items) if !items.is_empty() && items[0].is_object() => items.swap_remove(0),
        other => return Err(malformed(format!("expected a JSON object, got {other}"))),
    };

    serde_json::from_value(object).map_err(|e| malformed(e.to_string()))
}

/// First 200 characters, for error messages.
pub(crate) fn preview(s: &str) -> String {
    s.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_json() {
        let out = parse_model_output(
            "test",
            r#"{"type":"expense","amount":25000,"description":"Coffee","category":"coffee","confidence":0.92,"icon":"☕"}"#,
        )
        .unwrap();
        assert_eq!(out.transaction_type, Some(json!("expense")));
        assert_eq!(out.amount, Some(json!(25000)));
        assert_eq!(out.confidence, Some(json!(0.92)));
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let raw = "Here you go:\n```json\n{\"type\": \"saving\", \"amount\": \"200k\"}\n```\n";
        let out = parse_model_output("test", raw).unwrap();
        assert_eq!(out.transaction_type, Some(json!("saving")));
        assert_eq!(out.amount, Some(json!("200k")));
        assert_eq!(out.category, None);
    }

    #[test]
    fn test_parse_array_wrapped_object() {
        let out = parse_model_output("test", r#"[{"type":"investment"}]"#).unwrap();
        assert_eq!(out.transaction_type, Some(json!("investment")));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_model_output("test", ""),
            Err(CategorizerError::EmptyResponse { .. })
        ));
        assert!(matches!(
            parse_model_output("test", "I cannot help with that"),
            Err(CategorizerError::Malformed { .. })
        ));
        assert!(matches!(
            parse_model_output("test", "{\"type\": \"expense\","),
            Err(CategorizerError::Malformed { .. })
        ));
        assert!(matches!(
            parse_model_output("test", "[1, 2]"),
            Err(CategorizerError::Malformed { .. })
        ));
    }

    #[test]
    fn test_null_fields_are_missing() {
        let out = parse_model_output("test", r#"{"type":null,"category":null}"#).unwrap();
        assert_eq!(out, ExternalCategorization::default());
    }
}
