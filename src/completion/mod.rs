//! Completion calls: one prompt in, generated text (or a displayable error) out.
//!
//! [`CompletionClient`] is the only place in the crate that talks to a model.
//! Prompt text comes from [`crate::prompts`] and sequencing from
//! [`crate::crew`].
//!
//! The remote service sits behind the [`CompletionBackend`] trait:
//!
//! - [`groq::GroqBackend`] — OpenAI-compatible chat endpoint (Groq by default)
//! - [`provider::ProviderBackend`] — any `edgequake_llm::LLMProvider`
//!
//! A client built without a backend is *unconfigured*: every call returns
//! [`CompletionError::NotConfigured`] without touching the network, so the
//! tool stays usable (and testable) with no API key at all. A backend that
//! failed to build gives an *unavailable* client, which answers every call
//! with that construction error instead.

pub mod groq;
pub mod provider;

use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Temperature used when the caller does not pass one.
pub const DEFAULT_TEMPERATURE: f32 = 0.6;

/// A validated, single-use completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    prompt: String,
    model: String,
    temperature: f32,
}

impl CompletionRequest {
    /// Validate and build a request.
    ///
    /// Rejects an empty (or whitespace-only) prompt or model and any
    /// temperature outside `[0, 1]`.
    pub fn new(
        prompt: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Result<Self, CompletionError> {
        let prompt = prompt.into();
        let model = model.into();

        if prompt.trim().is_empty() {
            return Err(CompletionError::InvalidRequest("prompt is empty".into()));
        }
        if model.trim().is_empty() {
            return Err(CompletionError::InvalidRequest("model is empty".into()));
        }
        if !(0.0..=1.0).contains(&temperature) {
            return Err(CompletionError::InvalidRequest(format!(
                "temperature must be within 0.0–1.0, got {temperature}"
            )));
        }

        Ok(Self {
            prompt,
            model,
            temperature,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

/// Outcome of one completion call: generated text or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionResult {
    Text(String),
    Error(CompletionError),
}

impl CompletionResult {
    pub fn is_text(&self) -> bool {
        matches!(self, CompletionResult::Text(_))
    }

    /// The generated text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            CompletionResult::Text(t) => Some(t),
            CompletionResult::Error(_) => None,
        }
    }

    /// The error, if any.
    pub fn error(&self) -> Option<&CompletionError> {
        match self {
            CompletionResult::Text(_) => None,
            CompletionResult::Error(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<String, CompletionError> {
        match self {
            CompletionResult::Text(t) => Ok(t),
            CompletionResult::Error(e) => Err(e),
        }
    }
}

impl From<Result<String, CompletionError>> for CompletionResult {
    fn from(r: Result<String, CompletionError>) -> Self {
        match r {
            Ok(t) => CompletionResult::Text(t),
            Err(e) => CompletionResult::Error(e),
        }
    }
}

/// Renders either the generated text or the error message, which is exactly
/// what the presentation layer shows.
impl fmt::Display for CompletionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionResult::Text(t) => f.write_str(t),
            CompletionResult::Error(e) => write!(f, "{e}"),
        }
    }
}

/// A remote text-completion service.
///
/// Implementations perform exactly one outbound call per [`complete`] and
/// must not retry; every failure is mapped to a [`CompletionError`].
///
/// [`complete`]: CompletionBackend::complete
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short service label used as the error marker (`"Groq"` → `Groq Error: …`).
    fn service(&self) -> &str;

    /// Send a single user-role message and return the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Front door for completion calls.
///
/// Cheap to clone; the backend is shared behind an `Arc`.
#[derive(Clone)]
pub struct CompletionClient {
    backend: Option<Arc<dyn CompletionBackend>>,
    /// Returned by every call when `backend` is `None`.
    missing: CompletionError,
    default_model: String,
    default_temperature: f32,
}

impl fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionClient")
            .field("backend", &self.backend.as_ref().map(|b| b.service()))
            .field("missing", &self.missing)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .finish()
    }
}

impl CompletionClient {
    /// A client that sends every call to `backend`.
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend: Some(backend),
            missing: CompletionError::NotConfigured,
            default_model: DEFAULT_MODEL.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// A client with no credential: every call returns the not-configured error.
    pub fn unconfigured() -> Self {
        Self::unavailable(CompletionError::NotConfigured)
    }

    /// A client whose backend could not be built: every call returns `error`.
    pub fn unavailable(error: CompletionError) -> Self {
        Self {
            backend: None,
            missing: error,
            default_model: DEFAULT_MODEL.to_string(),
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_default_temperature(mut self, t: f32) -> Self {
        self.default_temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Run one completion.
    ///
    /// `model` and `temperature` fall back to the client defaults. Never
    /// panics: a missing credential, an invalid request and every remote
    /// failure come back as [`CompletionResult::Error`].
    pub async fn complete(
        &self,
        prompt: &str,
        model: Option<&str>,
        temperature: Option<f32>,
    ) -> CompletionResult {
        let Some(backend) = self.backend.as_ref() else {
            debug!("Completion skipped: {}", self.missing);
            return CompletionResult::Error(self.missing.clone());
        };

        let request = match CompletionRequest::new(
            prompt,
            model.unwrap_or(&self.default_model),
            temperature.unwrap_or(self.default_temperature),
        ) {
            Ok(r) => r,
            Err(e) => return CompletionResult::Error(e),
        };

        let start = Instant::now();
        debug!(
            "{}: model={} temperature={} prompt={} chars",
            backend.service(),
            request.model(),
            request.temperature(),
            request.prompt().chars().count()
        );

        match backend.complete(&request).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("{}: empty completion after {:?}", backend.service(), start.elapsed());
                CompletionResult::Error(CompletionError::EmptyResponse {
                    service: backend.service().to_string(),
                })
            }
            Ok(text) => {
                debug!(
                    "{}: {} chars in {:?}",
                    backend.service(),
                    text.len(),
                    start.elapsed()
                );
                CompletionResult::Text(text)
            }
            Err(e) => {
                warn!("{}: completion failed — {}", backend.service(), e);
                CompletionResult::Error(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        calls: Mutex<Vec<CompletionRequest>>,
        reply: Result<String, CompletionError>,
    }

    #[async_trait]
    impl CompletionBackend for Recording {
        fn service(&self) -> &str {
            "Mock"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.calls.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn recording(reply: Result<String, CompletionError>) -> Arc<Recording> {
        Arc::new(Recording {
            calls: Mutex::new(Vec::new()),
            reply,
        })
    }

    #[test]
    fn request_validation() {
        assert!(CompletionRequest::new("hi", "m", 0.0).is_ok());
        assert!(CompletionRequest::new("hi", "m", 1.0).is_ok());
        assert!(matches!(
            CompletionRequest::new("   ", "m", 0.5),
            Err(CompletionError::InvalidRequest(_))
        ));
        assert!(CompletionRequest::new("hi", "", 0.5).is_err());
        assert!(CompletionRequest::new("hi", "m", 1.2).is_err());
        assert!(CompletionRequest::new("hi", "m", -0.1).is_err());
        assert!(CompletionRequest::new("hi", "m", f32::NAN).is_err());
    }

    #[tokio::test]
    async fn unconfigured_client_returns_fixed_text() {
        let client = CompletionClient::unconfigured();
        for prompt in ["a cat", "", "anything at all"] {
            let r = client.complete(prompt, None, None).await;
            assert_eq!(r, CompletionResult::Error(CompletionError::NotConfigured));
            assert_eq!(
                r.to_string(),
                "Groq is not configured. Add GROQ_API_KEY in .env."
            );
        }
    }

    #[tokio::test]
    async fn unavailable_client_repeats_its_error() {
        let err = CompletionError::Unavailable {
            service: "OpenAI".into(),
            detail: "OPENAI_API_KEY is not set".into(),
        };
        let client = CompletionClient::unavailable(err.clone());
        assert!(!client.is_configured());
        let r = client.complete("a cat", None, None).await;
        assert_eq!(r, CompletionResult::Error(err));
        assert_eq!(
            r.to_string(),
            "OpenAI is not configured. OPENAI_API_KEY is not set"
        );
    }

    #[tokio::test]
    async fn defaults_are_applied() {
        let backend = recording(Ok("generated".into()));
        let client = CompletionClient::new(backend.clone()).with_default_temperature(0.3);
        let r = client.complete("hello", None, None).await;
        assert_eq!(r.text(), Some("generated"));

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model(), DEFAULT_MODEL);
        assert_eq!(calls[0].temperature(), 0.3);
    }

    #[tokio::test]
    async fn overrides_are_applied() {
        let backend = recording(Ok("ok".into()));
        let client = CompletionClient::new(backend.clone());
        client.complete("hello", Some("other-model"), Some(0.8)).await;
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0].model(), "other-model");
        assert_eq!(calls[0].temperature(), 0.8);
    }

    #[tokio::test]
    async fn invalid_request_makes_no_call() {
        let backend = recording(Ok("ok".into()));
        let client = CompletionClient::new(backend.clone());
        let r = client.complete("   ", None, None).await;
        assert!(matches!(r, CompletionResult::Error(CompletionError::InvalidRequest(_))));
        let r = client.complete("hi", None, Some(1.5)).await;
        assert!(!r.is_text());
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remote_error_is_returned_not_raised() {
        let backend = recording(Err(CompletionError::Remote {
            service: "Mock".into(),
            detail: "quota exceeded".into(),
        }));
        let client = CompletionClient::new(backend);
        let r = client.complete("hi", None, None).await;
        assert_eq!(r.to_string(), "Mock Error: quota exceeded");
    }

    #[tokio::test]
    async fn blank_completion_is_an_error() {
        let client = CompletionClient::new(recording(Ok("  \n".into())));
        let r = client.complete("hi", None, None).await;
        assert!(matches!(
            r.error(),
            Some(CompletionError::EmptyResponse { .. })
        ));
    }
}
