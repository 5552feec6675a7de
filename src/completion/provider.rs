//! Backend adapter for any `edgequake_llm` provider.
//!
//! Lets `--provider openai|anthropic|gemini|ollama|…` reuse the same action
//! code as the Groq default. The provider is bound to a model at construction
//! time, so the request's model only shows up in the debug log.

use super::{CompletionBackend, CompletionRequest};
use crate::error::CompletionError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// A [`CompletionBackend`] backed by an `edgequake_llm::LLMProvider`.
pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
    label: String,
    max_tokens: Option<usize>,
}

impl ProviderBackend {
    /// Wrap a pre-built provider. `name` becomes the error marker.
    pub fn new(provider: Arc<dyn LLMProvider>, name: &str) -> Self {
        Self {
            provider,
            label: service_label(name),
            max_tokens: None,
        }
    }

    /// Create a named provider via [`ProviderFactory::create_llm_provider`].
    ///
    /// The factory reads the provider's own API key variable
    /// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …). An unknown name or a
    /// missing key comes back as [`CompletionError::Unavailable`].
    pub fn from_name(name: &str, model: &str) -> Result<Self, CompletionError> {
        let provider = ProviderFactory::create_llm_provider(name, model).map_err(|e| {
            CompletionError::Unavailable {
                service: service_label(name),
                detail: e.to_string(),
            }
        })?;
        Ok(Self::new(provider, name))
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl CompletionBackend for ProviderBackend {
    fn service(&self) -> &str {
        &self.label
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        debug!("{}: requested model {}", self.label, request.model());

        let messages = vec![ChatMessage::user(request.prompt())];
        let options = CompletionOptions {
            temperature: Some(request.temperature()),
            max_tokens: self.max_tokens,
            ..Default::default()
        };

        self.provider
            .chat(&messages, Some(&options))
            .await
            .map(|response| response.content)
            .map_err(|e| CompletionError::Remote {
                service: self.label.clone(),
                detail: e.to_string(),
            })
    }
}

/// `"openai"` → `"OpenAI"`, `"anthropic"` → `"Anthropic"`.
fn service_label(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "openai" => "OpenAI".to_string(),
        "lmstudio" => "LM Studio".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => "LLM".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(service_label("openai"), "OpenAI");
        assert_eq!(service_label("anthropic"), "Anthropic");
        assert_eq!(service_label("OLLAMA"), "Ollama");
        assert_eq!(service_label(""), "LLM");
    }

    #[test]
    fn unknown_provider_is_unavailable() {
        let err = ProviderBackend::from_name("definitely-not-a-provider", "m")
            .err()
            .expect("unknown provider must not build");
        assert!(matches!(err, CompletionError::Unavailable { .. }));
        assert!(err.to_string().starts_with("Definitely-not-a-provider is not configured."));
    }
}
