//! Groq backend: OpenAI-compatible `POST /chat/completions` over reqwest.
//!
//! The request always carries a single user-role message. Groq's error body
//! follows the OpenAI shape (`{"error": {"message": …}}`); when the body is not
//! JSON the raw text (truncated) is surfaced instead so the user still sees
//! what went wrong.

use super::{CompletionBackend, CompletionRequest};
use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Groq endpoint (OpenAI-compatible surface).
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable holding the Groq API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable overriding [`GROQ_BASE_URL`].
pub const GROQ_BASE_URL_ENV: &str = "GROQ_BASE_URL";

const SERVICE: &str = "Groq";

/// Longest slice of a non-JSON error body echoed back to the user.
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 1],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Chat-completions client for Groq or any OpenAI-compatible endpoint.
pub struct GroqBackend {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    max_tokens: Option<usize>,
}

impl std::fmt::Debug for GroqBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqBackend")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GroqBackend {
    /// Build a backend for `base_url` (falls back to [`GROQ_BASE_URL`]).
    ///
    /// With `timeout_secs = None` the transport default applies.
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<Self, CompletionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| CompletionError::Unavailable {
                service: "Groq".into(),
                detail: format!("HTTP client could not be built: {e}"),
            })?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or(GROQ_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            max_tokens: None,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionBackend for GroqBackend {
    fn service(&self) -> &str {
        SERVICE
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = request_body(request, self.max_tokens);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| remote(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| remote(e.to_string()))?;
        debug!("Groq: HTTP {} ({} bytes)", status.as_u16(), text.len());

        parse_response(status.as_u16(), &text)
    }
}

fn remote(detail: String) -> CompletionError {
    CompletionError::Remote {
        service: SERVICE.to_string(),
        detail,
    }
}

fn request_body(request: &CompletionRequest, max_tokens: Option<usize>) -> ChatRequestBody<'_> {
    ChatRequestBody {
        model: request.model(),
        messages: [WireMessage {
            role: "user",
            content: request.prompt(),
        }],
        temperature: request.temperature(),
        max_tokens,
    }
}

/// Map an HTTP status and body to generated text or a [`CompletionError`].
fn parse_response(status: u16, body: &str) -> Result<String, CompletionError> {
    if !(200..300).contains(&status) {
        let message = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(err) => err.error.message,
            Err(_) => truncate(body.trim(), MAX_ERROR_BODY),
        };
        return Err(remote(format!("HTTP {status}: {message}")));
    }

    let parsed: ChatResponseBody = serde_json::from_str(body)
        .map_err(|e| remote(format!("malformed response: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| CompletionError::EmptyResponse {
            service: SERVICE.to_string(),
        })
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\u{2026}", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_has_single_user_message() {
        let req = CompletionRequest::new("draw a fox", "llama-3.1-8b-instant", 0.8).unwrap();
        let value = serde_json::to_value(request_body(&req, None)).unwrap();
        assert_eq!(value["model"], "llama-3.1-8b-instant");
        assert_eq!(
            value["messages"],
            json!([{"role": "user", "content": "draw a fox"}])
        );
        let t = value["temperature"].as_f64().unwrap();
        assert!((t - 0.8).abs() < 1e-6, "got {t}");
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn body_includes_max_tokens_when_set() {
        let req = CompletionRequest::new("p", "m", 0.5).unwrap();
        let value = serde_json::to_value(request_body(&req, Some(512))).unwrap();
        assert_eq!(value["max_tokens"], 512);
    }

    #[test]
    fn parse_success() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"A misty harbour"}}]}"#;
        assert_eq!(parse_response(200, body).unwrap(), "A misty harbour");
    }

    #[test]
    fn parse_no_choices() {
        let err = parse_response(200, r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(
            err,
            CompletionError::EmptyResponse {
                service: "Groq".into()
            }
        );
    }

    #[test]
    fn parse_malformed_body() {
        let err = parse_response(200, "<html>gateway</html>").unwrap_err();
        assert!(err.to_string().starts_with("Groq Error: malformed response"));
    }

    #[test]
    fn parse_api_error_json() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        let err = parse_response(401, body).unwrap_err();
        assert_eq!(err.to_string(), "Groq Error: HTTP 401: Invalid API Key");
    }

    #[test]
    fn parse_api_error_plain_text_is_truncated() {
        let body = "x".repeat(1000);
        let err = parse_response(503, &body).unwrap_err().to_string();
        assert!(err.starts_with("Groq Error: HTTP 503: xxx"));
        assert!(err.chars().count() < 400);
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let b = GroqBackend::new("k", Some("http://localhost:8080/v1/"), None).unwrap();
        assert_eq!(b.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert!(!format!("{b:?}").contains("\"k\""));
    }
}
