//! CLI binary for edgequake-art.
//!
//! A thin shim over the library crate that maps CLI flags to `HelperConfig`,
//! runs one action and prints (and optionally exports) its result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgequake_art::{
    analyze_style, export_to_file, generate_prompt, run_crew, ArtHelperError, CompletionResult,
    CrewOutcome, Feature, HelperConfig, PipelineProgressCallback, ProgressCallback, Session,
    StageChaining,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn spinner(prefix: &str, message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS);
    bar.set_style(style);
    bar.set_prefix(prefix.to_string());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress for the crew: one spinner, one log line per stage.
struct CrewSpinner {
    bar: ProgressBar,
    stage_started: Mutex<Option<Instant>>,
}

impl CrewSpinner {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: spinner("Crew", "assembling…"),
            stage_started: Mutex::new(None),
        })
    }

    fn stage_elapsed(&self) -> f64 {
        self.stage_started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl PipelineProgressCallback for CrewSpinner {
    fn on_pipeline_start(&self, total_stages: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Running {total_stages}-stage creative crew…"))
        ));
    }

    fn on_stage_start(&self, stage: usize, total: usize, persona: &str) {
        if let Ok(mut t) = self.stage_started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_prefix(format!("Stage {stage}/{total}"));
        self.bar.set_message(format!("{persona} is working…"));
    }

    fn on_stage_complete(&self, stage: usize, total: usize, output_len: usize) {
        self.bar.println(format!(
            "  {} Stage {}/{}  {:<8}  {}",
            green("✓"),
            stage,
            total,
            dim(&format!("{output_len:>5} chars")),
            dim(&format!("{:.1}s", self.stage_elapsed())),
        ));
    }

    fn on_stage_error(&self, stage: usize, total: usize, error: &str) {
        // Keep the log line short; the full message goes to stdout.
        let msg: String = if error.chars().count() > 80 {
            let mut s: String = error.chars().take(79).collect();
            s.push('…');
            s
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Stage {}/{}  {}  {}",
            red("✗"),
            stage,
            total,
            red(&msg),
            dim(&format!("{:.1}s", self.stage_elapsed())),
        ));
    }

    fn on_pipeline_complete(&self, total_stages: usize, completed_stages: usize) {
        self.bar.finish_and_clear();
        if completed_stages == total_stages {
            eprintln!("{} all {} stages complete", green("✔"), bold(&total_stages.to_string()));
        } else {
            eprintln!(
                "{} crew stopped after {}/{} stages",
                red("✘"),
                completed_stages,
                total_stages
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Enriched image-generation prompt
  art-helper prompt "a lone lighthouse at dusk" --style watercolor

  # Same, saved as ai_art_prompt.pdf
  art-helper prompt "a lone lighthouse at dusk" --style watercolor --pdf

  # Critique an artwork
  art-helper analyze "Van Gogh, The Starry Night" --pdf report.pdf

  # Three-stage crew, steered by a role hint
  art-helper crew "a cyberpunk market in the rain" --role-hint "Color Expert"

  # Use another provider and model
  art-helper --provider openai --model gpt-4.1-mini prompt "a fox in snow"

  # JSON output
  art-helper --json crew "an underwater cathedral" > crew.json

ENVIRONMENT VARIABLES:
  GROQ_API_KEY            Groq API key (also read from .env)
  GROQ_BASE_URL           Override the OpenAI-compatible endpoint
  ART_HELPER_MODEL        Override model ID (default llama-3.1-8b-instant)
  EDGEQUAKE_LLM_PROVIDER  Use an edgequake-llm provider instead of Groq
                          (openai, anthropic, gemini, ollama, …)

EXIT CODES:
  0  result printed
  1  the model call failed (message printed in place of the result)
  2  invalid input (e.g. empty description)
"#;

/// AI art prompt generator, style analyser and three-persona creative crew.
#[derive(Parser, Debug)]
#[command(
    name = "art-helper",
    version,
    about = "AI art prompt generator, style analyser and creative crew",
    long_about = "Turn short descriptions into enriched image-generation prompts, critique \
artworks, or run a three-persona crew (Art Director → Style Expert → Photographer) over an \
idea. Uses Groq by default and any edgequake-llm provider on request.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// LLM model ID (e.g. llama-3.1-8b-instant, llama-3.3-70b-versatile).
    #[arg(long, global = true, env = "ART_HELPER_MODEL")]
    model: Option<String>,

    /// edgequake-llm provider: openai, anthropic, gemini, ollama, … (default: Groq).
    #[arg(long, global = true, env = "EDGEQUAKE_LLM_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature (0.0–1.0). Overrides the per-action default.
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Max output tokens per completion.
    #[arg(long, global = true, env = "ART_HELPER_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Per-call HTTP timeout in seconds.
    #[arg(long, global = true, env = "ART_HELPER_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Also export the result as PDF (default file name per action).
    #[arg(long, global = true, num_args = 0..=1, value_name = "PATH")]
    pdf: Option<Option<PathBuf>>,

    /// Output structured JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,

    /// Keep the model output exactly as returned (no fence/whitespace cleanup).
    #[arg(long, global = true)]
    raw: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an enriched image-generation prompt.
    Prompt {
        /// What the image should show.
        description: String,

        /// Art style (e.g. watercolor, cinematic, ukiyo-e).
        #[arg(short, long, default_value = "")]
        style: String,
    },

    /// Critique an artwork: style, lighting, colour, mood, composition.
    Analyze {
        /// The artwork, described in words.
        description: String,
    },

    /// Run the three-stage creative crew over an idea.
    Crew {
        /// The idea or question to work on.
        query: String,

        /// Perspective for the first stage (e.g. "Color Expert").
        #[arg(long)]
        role_hint: Option<String>,

        /// Stages do not see the previous stage's output.
        #[arg(long)]
        independent: bool,
    },
}

impl Command {
    fn feature(&self) -> Feature {
        match self {
            Command::Prompt { .. } => Feature::Prompt,
            Command::Analyze { .. } => Feature::Analysis,
            Command::Crew { .. } => Feature::Crew,
        }
    }
}

/// What one action produced, ready for printing.
struct Outcome {
    text: String,
    ok: bool,
    json: serde_json::Value,
}

impl From<CompletionResult> for Outcome {
    fn from(r: CompletionResult) -> Self {
        Self {
            text: r.to_string(),
            ok: r.is_text(),
            json: json!({ "ok": r.is_text(), "result": r }),
        }
    }
}

impl From<CrewOutcome> for Outcome {
    fn from(o: CrewOutcome) -> Self {
        let json = match &o {
            CrewOutcome::Completed(run) => json!({
                "ok": true,
                "result": run.final_output(),
                "stages": run.stages,
                "duration_ms": run.duration_ms,
            }),
            CrewOutcome::Failed(e) => json!({
                "ok": false,
                "error": e.to_string(),
                "failed_stage": e.stage,
            }),
        };
        Self {
            text: o.to_string(),
            ok: o.is_completed(),
            json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env is fine; the key may come from the real environment.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let crew_spinner = match (&cli.command, show_progress) {
        (Command::Crew { .. }, true) => Some(CrewSpinner::new()),
        _ => None,
    };
    let progress: Option<ProgressCallback> = crew_spinner
        .clone()
        .map(|cb| cb as Arc<dyn PipelineProgressCallback>);
    let config = build_config(&cli, progress)?;

    // ── Run action ───────────────────────────────────────────────────────
    let feature = cli.command.feature();
    let single_spinner = (show_progress && crew_spinner.is_none())
        .then(|| spinner(feature.document_title(), "waiting for the model…"));

    let result: Result<Outcome, ArtHelperError> = match &cli.command {
        Command::Prompt { description, style } => generate_prompt(description, style, &config)
            .await
            .map(Outcome::from),
        Command::Analyze { description } => {
            analyze_style(description, &config).await.map(Outcome::from)
        }
        Command::Crew {
            query, role_hint, ..
        } => run_crew(query, role_hint.as_deref(), &config)
            .await
            .map(Outcome::from),
    };

    if let Some(bar) = single_spinner {
        bar.finish_and_clear();
    }

    let outcome = match result {
        Ok(o) => o,
        Err(e @ ArtHelperError::EmptyInput { .. }) => {
            eprintln!("{} {}", red("✘"), e);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e).context("Action failed"),
    };

    // ── Print ────────────────────────────────────────────────────────────
    let mut session = Session::new();
    if outcome.ok {
        session.record(feature, outcome.text.as_str());
    }

    let mut json_out = outcome.json;
    let pdf_path = match (&cli.pdf, session.last(feature)) {
        (Some(path), Some(body)) => {
            let written = export_to_file(feature, body, path.as_deref())
                .await
                .context("PDF export failed")?;
            Some(written)
        }
        (Some(_), None) => {
            if !cli.quiet {
                eprintln!("{} nothing to export: the action failed", cyan("⚠"));
            }
            None
        }
        (None, _) => None,
    };

    if cli.json {
        if let Some(ref p) = pdf_path {
            json_out["pdf"] = json!(p.display().to_string());
        }
        let text = serde_json::to_string_pretty(&json_out).context("Failed to serialise output")?;
        println!("{text}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(outcome.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !outcome.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        if let (Some(p), false) = (&pdf_path, cli.quiet) {
            eprintln!("{}  PDF  →  {}", green("✔"), bold(&p.display().to_string()));
        }
    }

    Ok(if outcome.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Map CLI args to `HelperConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<HelperConfig> {
    let mut builder = HelperConfig::builder().clean_output(!cli.raw);

    if let Command::Crew { independent: true, .. } = cli.command {
        builder = builder.chaining(StageChaining::Independent);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(t) = cli.temperature {
        if !(0.0..=1.0).contains(&t) {
            anyhow::bail!("--temperature must be within 0.0–1.0 (got {t})");
        }
        builder = builder
            .prompt_temperature(t)
            .analysis_temperature(t)
            .crew_temperature(t);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
