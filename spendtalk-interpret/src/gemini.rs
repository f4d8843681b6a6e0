//! Google Gemini `generateContent` categorizer.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use spendtalk_core::{ExpenseCategory, Language};
use tracing::{debug, info};

use crate::external::{
    parse_model_output, preview, CategorizerError, ExternalCategorization, ExternalCategorizer,
};

pub const PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiCategorizer {
    config: GeminiConfig,
}

impl GeminiCategorizer {
    pub fn new(config: GeminiConfig) -> Self {
        Self { config }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn categorize_async(
        &self,
        text: &str,
        language: Language,
    ) -> Result<ExternalCategorization, CategorizerError> {
        let network = |e: reqwest::Error| {
            if e.is_timeout() {
                CategorizerError::Timeout { provider: PROVIDER, after: self.config.timeout }
            } else {
                CategorizerError::Network { provider: PROVIDER, message: e.to_string() }
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(self.config.api_key.trim()).map_err(|e| CategorizerError::Network {
            provider: PROVIDER,
            message: format!("invalid api key header: {e}"),
        })?;
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.config.timeout)
            .build()
            .map_err(network)?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: build_prompt(text, language) }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        info!(model = %self.config.model, "requesting categorization from gemini");
        let resp = client.post(self.endpoint()).json(&body).send().await.map_err(network)?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(CategorizerError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: preview(&txt),
            });
        }

        let out: GenerateContentResponse = resp.json().await.map_err(|e| CategorizerError::Malformed {
            provider: PROVIDER,
            message: format!("response body: {e}"),
        })?;
        let raw = response_text(&out).ok_or(CategorizerError::EmptyResponse { provider: PROVIDER })?;
        debug!(raw = %preview(&raw), "gemini answered");

        parse_model_output(PROVIDER, &raw)
    }
}

impl ExternalCategorizer for GeminiCategorizer {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn categorize(
        &self,
        text: &str,
        language: Language,
    ) -> Result<ExternalCategorization, CategorizerError> {
        if self.config.api_key.trim().is_empty() {
            return Err(CategorizerError::MissingApiKey { provider: PROVIDER });
        }

        let after = self.config.timeout;
        block_on(async move {
            match tokio::time::timeout(after, self.categorize_async(text, language)).await {
                Ok(result) => result,
                Err(_) => Err(CategorizerError::Timeout { provider: PROVIDER, after }),
            }
        })
    }
}

/// Run `fut` to completion from synchronous code.
///
/// Inside a multi-thread runtime (the CLI's `#[tokio::main]`) we borrow the
/// ambient runtime through `block_in_place`. A current-thread runtime cannot
/// be blocked from within, so the future runs on a scoped thread with its own
/// runtime instead.
fn block_on<F>(fut: F) -> Result<ExternalCategorization, CategorizerError>
where
    F: Future<Output = Result<ExternalCategorization, CategorizerError>> + Send,
{
    use tokio::runtime::{Builder, Handle, RuntimeFlavor};

    let fresh = |fut: F| {
        let rt = Builder::new_current_thread().enable_all().build().map_err(|e| {
            CategorizerError::Runtime { provider: PROVIDER, message: format!("create tokio runtime: {e}") }
        })?;
        rt.block_on(fut)
    };

    match Handle::try_current() {
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| handle.block_on(fut)),
            _ => std::thread::scope(|s| {
                s.spawn(|| fresh(fut)).join().unwrap_or_else(|_| {
                    Err(CategorizerError::Runtime {
                        provider: PROVIDER,
                        message: "categorizer thread panicked".to_string(),
                    })
                })
            }),
        },
        Err(_) => fresh(fut),
    }
}

fn build_prompt(text: &str, language: Language) -> String {
    let categories = ExpenseCategory::ALL
        .iter()
        .map(|c| c.code())
        .collect::<Vec<_>>()
        .join(", ");
    let description_language = match language {
        Language::Vi => "Vietnamese",
        Language::En => "English",
    };

    format!(
        "You categorize personal finance messages written by Vietnamese users.\n\
         Classify the message below and answer with ONE JSON object, no prose:\n\
         {{\"type\": \"expense\" | \"saving\" | \"investment\",\n\
          \"amount\": number in VND,\n\
          \"description\": short description in {description_language},\n\
          \"category\": one of [{categories}] when type is expense, otherwise null,\n\
          \"confidence\": number between 0 and 1,\n\
          \"icon\": a single emoji}}\n\
         Amount rules: \"k\" or \"nghìn\" means thousand, \"tr\", \"triệu\" or \"củ\" means million; \
         a bare number below 1000 is in thousands of VND.\n\
         Message: {text}"
    )
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Concatenated text parts of the first candidate; `None` when there is no
/// non-blank text.
fn response_text(resp: &GenerateContentResponse) -> Option<String> {
    let parts = resp.candidates.as_ref()?.first()?.content.as_ref()?.parts.as_ref()?;
    let s: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
    if s.trim().is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GenerateContentResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_endpoint_uses_model_and_base_url() {
        let mut cfg = GeminiConfig::new("k");
        cfg.base_url = "http://localhost:8080/".to_string();
        let g = GeminiCategorizer::new(cfg);
        assert_eq!(g.endpoint(), "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let resp = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"type\":"},{"text":"\"saving\"}"}]}}]}"#,
        );
        let raw = response_text(&resp).unwrap();
        assert_eq!(raw, r#"{"type":"saving"}"#);
        let out = parse_model_output(PROVIDER, &raw).unwrap();
        assert_eq!(out.transaction_type, Some(serde_json::json!("saving")));
    }

    #[test]
    fn test_response_text_empty_cases() {
        assert!(response_text(&parse(r#"{}"#)).is_none());
        assert!(response_text(&parse(r#"{"candidates":[]}"#)).is_none());
        assert!(response_text(&parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)).is_none());
        assert!(response_text(&parse(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)).is_none());
    }

    #[test]
    fn test_missing_key_fails_without_network() {
        let g = GeminiCategorizer::new(GeminiConfig::new("  "));
        assert!(matches!(
            g.categorize("coffee 25k", Language::Vi),
            Err(CategorizerError::MissingApiKey { provider: PROVIDER })
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        let mut cfg = GeminiConfig::new("test-key");
        // Port 9 (discard) on localhost: connection refused right away
        cfg.base_url = "http://127.0.0.1:9".to_string();
        cfg.timeout = Duration::from_secs(2);
        let g = GeminiCategorizer::new(cfg);
        let err = g.categorize("coffee 25k", Language::Vi).unwrap_err();
        assert!(matches!(
            err,
            CategorizerError::Network { .. } | CategorizerError::Timeout { .. }
        ));
    }

    #[tokio::test]
    async fn test_current_thread_runtime_does_not_panic() {
        let mut cfg = GeminiConfig::new("test-key");
        cfg.base_url = "http://127.0.0.1:9".to_string();
        cfg.timeout = Duration::from_secs(2);
        let g = GeminiCategorizer::new(cfg);
        assert!(g.categorize("coffee 25k", Language::En).is_err());
    }

    #[test]
    fn test_prompt_lists_categories_and_message() {
        let p = build_prompt("phở 45k", Language::Vi);
        assert!(p.contains("food, coffee, transport"));
        assert!(p.contains("Message: phở 45k"));
        assert!(p.contains("Vietnamese"));
    }
}
