//! User-facing entry points: prompt generation, style analysis, the crew run
//! and PDF export.
//!
//! ## Result shape
//!
//! Every action first validates its required input. An empty (or
//! whitespace-only) description or query is rejected with
//! [`ArtHelperError::EmptyInput`] before a client is even resolved, so a
//! validation failure never costs a network call.
//!
//! Past validation, model-side failures are *displayable*, not fatal: a
//! missing key, a provider that cannot be built or a remote error comes back
//! as text in
//! [`CompletionResult::Error`] / [`CrewOutcome::Failed`], exactly what the
//! user sees in place of the generated text.

use crate::completion::groq::{GroqBackend, GROQ_API_KEY_ENV, GROQ_BASE_URL_ENV};
use crate::completion::provider::ProviderBackend;
use crate::completion::{CompletionBackend, CompletionClient, CompletionResult};
use crate::config::HelperConfig;
use crate::crew::{PipelineRun, SequentialPipeline};
use crate::error::{ArtHelperError, CompletionError, InputField, PipelineError};
use crate::export::DocumentExporter;
use crate::postprocess::clean_response;
use crate::prompts::{build_art_prompt, build_style_analysis_prompt};
use crate::session::Feature;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Model bound to a named edgequake-llm provider when none is configured.
const PROVIDER_DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Environment variable naming an edgequake-llm provider to use instead of Groq.
pub const PROVIDER_ENV: &str = "EDGEQUAKE_LLM_PROVIDER";

/// Outcome of a crew run that got past validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrewOutcome {
    Completed(PipelineRun),
    Failed(PipelineError),
}

impl CrewOutcome {
    /// The final stage's text, if the run completed.
    pub fn text(&self) -> Option<&str> {
        match self {
            CrewOutcome::Completed(run) => Some(run.final_output()),
            CrewOutcome::Failed(_) => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, CrewOutcome::Completed(_))
    }
}

impl From<Result<PipelineRun, PipelineError>> for CrewOutcome {
    fn from(r: Result<PipelineRun, PipelineError>) -> Self {
        match r {
            Ok(run) => CrewOutcome::Completed(run),
            Err(e) => CrewOutcome::Failed(e),
        }
    }
}

/// The final text on success, the `Crew Error: …` line on failure.
impl fmt::Display for CrewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewOutcome::Completed(run) => f.write_str(run.final_output()),
            CrewOutcome::Failed(e) => write!(f, "{e}"),
        }
    }
}

/// Turn a short description into an enriched image-generation prompt.
///
/// `style` may be empty; the prompt still carries a `Style:` line.
///
/// # Errors
/// Only [`ArtHelperError::EmptyInput`] (blank description). Configuration
/// and model-side failures are inside the returned result.
///
/// # Example
/// ```rust,no_run
/// use edgequake_art::{generate_prompt, HelperConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HelperConfig::default();
/// let result = generate_prompt("a lone lighthouse at dusk", "watercolor", &config).await?;
/// println!("{result}");
/// # Ok(())
/// # }
/// ```
pub async fn generate_prompt(
    description: &str,
    style: &str,
    config: &HelperConfig,
) -> Result<CompletionResult, ArtHelperError> {
    require(description, InputField::Description)?;
    info!("Generating art prompt ({} chars)", description.len());

    let client = resolve_client(config);
    let prompt = build_art_prompt(description, style);
    let result = client
        .complete(&prompt, None, Some(config.prompt_temperature))
        .await;
    Ok(finish(result, config))
}

/// Critique an artwork described in words: style, lighting, colour, mood,
/// composition and suggested improvements.
pub async fn analyze_style(
    description: &str,
    config: &HelperConfig,
) -> Result<CompletionResult, ArtHelperError> {
    require(description, InputField::Description)?;
    info!("Analysing art style ({} chars)", description.len());

    let client = resolve_client(config);
    let prompt = build_style_analysis_prompt(description);
    let result = client
        .complete(&prompt, None, Some(config.analysis_temperature))
        .await;
    Ok(finish(result, config))
}

/// Run the three-stage crew (concept → style → camera) for `query`.
///
/// A non-blank `role_hint` steers the first stage. Exactly three completion
/// calls on success; the first failing stage ends the run.
pub async fn run_crew(
    query: &str,
    role_hint: Option<&str>,
    config: &HelperConfig,
) -> Result<CrewOutcome, ArtHelperError> {
    require(query, InputField::Query)?;
    info!("Running creative crew ({} chars)", query.len());

    let client = resolve_client(config);
    let pipeline = SequentialPipeline::default()
        .with_model(config.model.clone())
        .with_chaining(config.chaining)
        .with_temperature(config.crew_temperature)
        .with_progress(config.progress_callback.clone());

    let outcome = match pipeline.run(&client, query, role_hint).await {
        Ok(mut run) => {
            if config.clean_output {
                for stage in &mut run.stages {
                    stage.text = clean_or_keep(&stage.text);
                }
            }
            CrewOutcome::Completed(run)
        }
        Err(e) => CrewOutcome::Failed(e),
    };
    Ok(outcome)
}

/// Render `body` as the PDF for `feature` (title from [`Feature::document_title`]).
pub fn render_pdf(feature: Feature, body: &str) -> Result<Vec<u8>, ArtHelperError> {
    Ok(DocumentExporter::default().export(feature.document_title(), body)?)
}

/// Render `body` as the PDF for `feature` and write it to disk.
///
/// `path` defaults to [`Feature::file_name`] in the current directory. The
/// write is atomic (temp file + rename), so a reader never sees a partial PDF.
/// Returns the path written.
pub async fn export_to_file(
    feature: Feature,
    body: &str,
    path: Option<&Path>,
) -> Result<PathBuf, ArtHelperError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(feature.file_name()));
    let bytes = render_pdf(feature, body)?;

    let write_err = |source: std::io::Error| ArtHelperError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(write_err)?;

    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Synchronous wrapper around [`generate_prompt`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_prompt_sync(
    description: &str,
    style: &str,
    config: &HelperConfig,
) -> Result<CompletionResult, ArtHelperError> {
    runtime()?.block_on(generate_prompt(description, style, config))
}

/// Synchronous wrapper around [`analyze_style`].
pub fn analyze_style_sync(
    description: &str,
    config: &HelperConfig,
) -> Result<CompletionResult, ArtHelperError> {
    runtime()?.block_on(analyze_style(description, config))
}

/// Synchronous wrapper around [`run_crew`].
pub fn run_crew_sync(
    query: &str,
    role_hint: Option<&str>,
    config: &HelperConfig,
) -> Result<CrewOutcome, ArtHelperError> {
    runtime()?.block_on(run_crew(query, role_hint, config))
}

/// Build the completion client for `config`, from most-specific to
/// least-specific:
///
/// 1. **Pre-built backend** (`config.backend`), used as-is.
/// 2. **Named provider** (`config.provider_name`) via edgequake-llm's factory,
///    which reads that provider's own API key variable.
/// 3. **`EDGEQUAKE_LLM_PROVIDER`** set in the environment, same as 2.
/// 4. **Groq key** (`config.api_key`, else `GROQ_API_KEY`) for the
///    OpenAI-compatible Groq endpoint (`config.base_url`, else
///    `GROQ_BASE_URL`, else the public Groq URL).
/// 5. Otherwise an unconfigured client, whose every call returns the
///    not-configured message.
///
/// A backend that fails to build (unknown provider name, provider key
/// missing) yields a client that answers every call with that error.
pub fn resolve_client(config: &HelperConfig) -> CompletionClient {
    let client = match select_backend(config) {
        Ok(Some(backend)) => {
            debug!("Completion backend: {}", backend.service());
            CompletionClient::new(backend)
        }
        Ok(None) => {
            debug!("No completion backend configured");
            CompletionClient::unconfigured()
        }
        Err(e) => {
            warn!("Completion backend unavailable: {e}");
            CompletionClient::unavailable(e)
        }
    };

    match config.model.as_deref() {
        Some(model) => client.with_default_model(model),
        None => client,
    }
}

fn select_backend(
    config: &HelperConfig,
) -> Result<Option<Arc<dyn CompletionBackend>>, CompletionError> {
    if let Some(ref backend) = config.backend {
        return Ok(Some(Arc::clone(backend)));
    }

    let provider_name = config
        .provider_name
        .clone()
        .or_else(|| non_empty_env(PROVIDER_ENV));
    if let Some(name) = provider_name {
        let model = config.model.as_deref().unwrap_or(PROVIDER_DEFAULT_MODEL);
        let backend = ProviderBackend::from_name(&name, model)?.with_max_tokens(config.max_tokens);
        return Ok(Some(Arc::new(backend)));
    }

    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| non_empty_env(GROQ_API_KEY_ENV));
    if let Some(key) = api_key {
        let base_url = config
            .base_url
            .clone()
            .or_else(|| non_empty_env(GROQ_BASE_URL_ENV));
        let backend = GroqBackend::new(key, base_url.as_deref(), config.api_timeout_secs)?
            .with_max_tokens(config.max_tokens);
        return Ok(Some(Arc::new(backend)));
    }

    Ok(None)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn require(value: &str, field: InputField) -> Result<(), ArtHelperError> {
    if value.trim().is_empty() {
        debug!("Rejected empty {:?}", field);
        return Err(ArtHelperError::EmptyInput { field });
    }
    Ok(())
}

fn finish(result: CompletionResult, config: &HelperConfig) -> CompletionResult {
    match result {
        CompletionResult::Text(text) if config.clean_output => {
            CompletionResult::Text(clean_or_keep(&text))
        }
        other => other,
    }
}

/// Cleaned text, or the raw text if cleanup would leave nothing.
fn clean_or_keep(text: &str) -> String {
    let cleaned = clean_response(text);
    if cleaned.is_empty() {
        text.to_string()
    } else {
        cleaned
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ArtHelperError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ArtHelperError::Internal(format!("Failed to create tokio runtime: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Echo {
        requests: Mutex<Vec<CompletionRequest>>,
        reply: String,
    }

    impl Echo {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionBackend for Echo {
        fn service(&self) -> &str {
            "Mock"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn config_with(backend: Arc<Echo>) -> HelperConfig {
        HelperConfig::builder().backend(backend).build().unwrap()
    }

    #[test]
    fn blank_inputs_are_rejected_without_calls() {
        let backend = Echo::new("unused");
        let config = config_with(backend.clone());

        let e = generate_prompt_sync("   ", "watercolor", &config).unwrap_err();
        assert_eq!(e.to_string(), "Please enter a description.");
        let e = analyze_style_sync("", &config).unwrap_err();
        assert!(matches!(
            e,
            ArtHelperError::EmptyInput {
                field: InputField::Description
            }
        ));
        let e = run_crew_sync("\n\t", None, &config).unwrap_err();
        assert_eq!(e.to_string(), "Please enter a question.");

        assert_eq!(backend.calls(), 0);
    }

    #[test]
    fn prompt_uses_prompt_temperature() {
        let backend = Echo::new("a prompt");
        let config = HelperConfig::builder()
            .backend(backend.clone())
            .prompt_temperature(0.9)
            .build()
            .unwrap();
        let r = generate_prompt_sync("a cat", "", &config).unwrap();
        assert_eq!(r.text(), Some("a prompt"));

        let reqs = backend.requests.lock().unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].temperature(), 0.9);
        assert!(reqs[0].prompt().ends_with("Description: a cat\nStyle: "));
    }

    #[test]
    fn analysis_uses_analysis_temperature() {
        let backend = Echo::new("report");
        let config = config_with(backend.clone());
        analyze_style_sync("Starry Night", &config).unwrap();
        let reqs = backend.requests.lock().unwrap();
        assert_eq!(reqs[0].temperature(), 0.55);
        assert!(reqs[0].prompt().ends_with("Artwork: Starry Night"));
    }

    #[test]
    fn configured_model_reaches_the_request() {
        let backend = Echo::new("x");
        let config = HelperConfig::builder()
            .backend(backend.clone())
            .model("llama-3.3-70b-versatile")
            .build()
            .unwrap();
        generate_prompt_sync("a cat", "oil", &config).unwrap();
        assert_eq!(
            backend.requests.lock().unwrap()[0].model(),
            "llama-3.3-70b-versatile"
        );
    }

    #[test]
    fn output_is_cleaned_unless_disabled() {
        let backend = Echo::new("```markdown\nA misty harbour\r\n```");
        let config = config_with(backend.clone());
        let r = generate_prompt_sync("harbour", "", &config).unwrap();
        assert_eq!(r.text(), Some("A misty harbour"));

        let config = HelperConfig::builder()
            .backend(backend)
            .clean_output(false)
            .build()
            .unwrap();
        let r = generate_prompt_sync("harbour", "", &config).unwrap();
        assert!(r.text().unwrap().starts_with("```markdown"));
    }

    #[test]
    fn crew_outcome_display() {
        let backend = Echo::new("final scene");
        let outcome = run_crew_sync("q", None, &config_with(backend.clone())).unwrap();
        assert!(outcome.is_completed());
        assert_eq!(outcome.to_string(), "final scene");
        assert_eq!(backend.calls(), 3);
    }

    #[test]
    fn render_pdf_uses_feature_title() {
        let pdf = render_pdf(Feature::Crew, "body").unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
