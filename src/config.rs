//! Configuration for the art helper actions.
//!
//! Every knob lives in [`HelperConfig`], built via its
//! [`HelperConfigBuilder`]. Callers set only what they care about and rely on
//! the documented defaults for the rest.

use crate::completion::CompletionBackend;
use crate::crew::{StageChaining, CREW_TEMPERATURE};
use crate::error::ArtHelperError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Default temperature for prompt generation (favours creative variation).
pub const PROMPT_TEMPERATURE: f32 = 0.8;

/// Default temperature for style analysis (favours consistency).
pub const ANALYSIS_TEMPERATURE: f32 = 0.55;

/// Configuration shared by [`crate::actions`].
///
/// # Example
/// ```rust
/// use edgequake_art::HelperConfig;
///
/// let config = HelperConfig::builder()
///     .model("llama-3.3-70b-versatile")
///     .prompt_temperature(0.9)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct HelperConfig {
    /// Model identifier. If None, uses `llama-3.1-8b-instant` for Groq or
    /// `gpt-4.1-nano` for a named provider.
    pub model: Option<String>,

    /// edgequake-llm provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, the Groq endpoint is used.
    pub provider_name: Option<String>,

    /// Pre-constructed backend. Takes precedence over everything else.
    pub backend: Option<Arc<dyn CompletionBackend>>,

    /// Groq API key. If None, read from `GROQ_API_KEY`.
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL. If None, `GROQ_BASE_URL` or the Groq default.
    pub base_url: Option<String>,

    /// Temperature for [`crate::actions::generate_prompt`]. Default: 0.8.
    pub prompt_temperature: f32,

    /// Temperature for [`crate::actions::analyze_style`]. Default: 0.55.
    pub analysis_temperature: f32,

    /// Temperature for every crew stage. Default: 0.6.
    pub crew_temperature: f32,

    /// Maximum tokens per completion. If None, the service default applies.
    pub max_tokens: Option<usize>,

    /// Per-call HTTP timeout in seconds. If None, the transport default applies.
    pub api_timeout_secs: Option<u64>,

    /// Whether crew stages see the previous stage's output. Default: chained.
    pub chaining: StageChaining,

    /// Run [`crate::postprocess::clean_response`] on generated text. Default: true.
    pub clean_output: bool,

    /// Crew progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            backend: None,
            api_key: None,
            base_url: None,
            prompt_temperature: PROMPT_TEMPERATURE,
            analysis_temperature: ANALYSIS_TEMPERATURE,
            crew_temperature: CREW_TEMPERATURE,
            max_tokens: None,
            api_timeout_secs: None,
            chaining: StageChaining::default(),
            clean_output: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for HelperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|b| b.service().to_string()))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("prompt_temperature", &self.prompt_temperature)
            .field("analysis_temperature", &self.analysis_temperature)
            .field("crew_temperature", &self.crew_temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("chaining", &self.chaining)
            .field("clean_output", &self.clean_output)
            .finish()
    }
}

impl HelperConfig {
    /// Create a new builder for `HelperConfig`.
    pub fn builder() -> HelperConfigBuilder {
        HelperConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`HelperConfig`].
#[derive(Debug)]
pub struct HelperConfigBuilder {
    config: HelperConfig,
}

impl HelperConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn prompt_temperature(mut self, t: f32) -> Self {
        self.config.prompt_temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn analysis_temperature(mut self, t: f32) -> Self {
        self.config.analysis_temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn crew_temperature(mut self, t: f32) -> Self {
        self.config.crew_temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn chaining(mut self, chaining: StageChaining) -> Self {
        self.config.chaining = chaining;
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.clean_output = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<HelperConfig, ArtHelperError> {
        let c = &self.config;
        if c.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(ArtHelperError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_tokens == Some(0) {
            return Err(ArtHelperError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(ArtHelperError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        for (name, t) in [
            ("prompt_temperature", c.prompt_temperature),
            ("analysis_temperature", c.analysis_temperature),
            ("crew_temperature", c.crew_temperature),
        ] {
            if !(0.0..=1.0).contains(&t) {
                return Err(ArtHelperError::InvalidConfig(format!(
                    "{name} must be within 0.0–1.0, got {t}"
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = HelperConfig::default();
        assert_eq!(c.prompt_temperature, 0.8);
        assert_eq!(c.analysis_temperature, 0.55);
        assert_eq!(c.crew_temperature, 0.6);
        assert_eq!(c.chaining, StageChaining::Chained);
        assert!(c.clean_output);
        assert!(c.api_timeout_secs.is_none());
    }

    #[test]
    fn temperatures_are_clamped() {
        let c = HelperConfig::builder()
            .prompt_temperature(3.0)
            .analysis_temperature(-1.0)
            .build()
            .unwrap();
        assert_eq!(c.prompt_temperature, 1.0);
        assert_eq!(c.analysis_temperature, 0.0);
    }

    #[test]
    fn nan_temperature_rejected() {
        let r = HelperConfig::builder().crew_temperature(f32::NAN).build();
        assert!(matches!(r, Err(ArtHelperError::InvalidConfig(_))));
    }

    #[test]
    fn empty_model_rejected() {
        assert!(HelperConfig::builder().model("  ").build().is_err());
        assert!(HelperConfig::builder().max_tokens(0).build().is_err());
        assert!(HelperConfig::builder().api_timeout_secs(0).build().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = HelperConfig::builder().api_key("gsk_secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("gsk_secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
