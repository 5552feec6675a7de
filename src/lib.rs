//! # edgequake-art
//!
//! A small creative assistant for image-generation work, driven by a hosted
//! LLM (Groq by default, any edgequake-llm provider on request).
//!
//! ## What it does
//!
//! | Action | Input | Output |
//! |--------|-------|--------|
//! | [`generate_prompt`] | description + style | enriched image-generation prompt |
//! | [`analyze_style`]   | artwork description | critique: style, light, colour, mood, composition |
//! | [`run_crew`]        | query (+ role hint) | three-persona refinement of the idea |
//!
//! Any result can be rendered to a PDF with [`export_to_file`] or
//! [`render_pdf`].
//!
//! ## Crew Overview
//!
//! ```text
//! query
//!  │
//!  ├─ 1. Art Director   core concept (scene, subject, mood)
//!  ├─ 2. Style Expert   lighting, colour palette, style references
//!  └─ 3. Photographer   camera, lens, framing, composition
//!                      └─▶ final text
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_art::{generate_prompt, HelperConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GROQ_API_KEY; without it the result is the not-configured message.
//!     let config = HelperConfig::default();
//!     let result = generate_prompt("a lone lighthouse at dusk", "watercolor", &config).await?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `art-helper` binary (clap + anyhow + indicatif + tracing-subscriber + dotenvy) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-art = { version = "0.1", default-features = false }
//! ```
//!
//! ## Choosing a Model
//!
//! | Model | Service | Notes |
//! |-------|---------|-------|
//! | `llama-3.1-8b-instant` | Groq | Default, fast |
//! | `llama-3.3-70b-versatile` | Groq | Richer prose |
//! | `gpt-4.1-nano` | OpenAI (`--provider openai`) | Default for named providers |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod actions;
pub mod completion;
pub mod config;
pub mod crew;
pub mod error;
pub mod export;
pub mod postprocess;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use actions::{
    analyze_style, analyze_style_sync, export_to_file, generate_prompt, generate_prompt_sync,
    render_pdf, resolve_client, run_crew, run_crew_sync, CrewOutcome,
};
pub use completion::{CompletionBackend, CompletionClient, CompletionRequest, CompletionResult};
pub use config::{HelperConfig, HelperConfigBuilder};
pub use crew::{PipelineRun, SequentialPipeline, StageChaining, StageOutput};
pub use error::{ArtHelperError, CompletionError, ExportError, PipelineError};
pub use export::{export_pdf, DocumentExporter, ExportDocument};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
pub use session::{Feature, Session};
