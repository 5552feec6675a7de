//! Progress-callback trait for crew pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::HelperConfigBuilder::progress_callback`] to receive events
//! as the crew works through its stages. The CLI uses it to drive a spinner;
//! a web front end could forward the events over a socket instead.
//!
//! # Example
//!
//! ```rust
//! use edgequake_art::{HelperConfig, PipelineProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PipelineProgressCallback for Printer {
//!     fn on_stage_start(&self, stage: usize, total: usize, persona: &str) {
//!         eprintln!("[{stage}/{total}] {persona} is working…");
//!     }
//! }
//!
//! let config = HelperConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the crew pipeline as it runs each stage.
///
/// Stages run strictly one after another, so calls never overlap within one
/// run. All methods default to no-ops.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called once before the first stage.
    fn on_pipeline_start(&self, total_stages: usize) {
        let _ = total_stages;
    }

    /// Called just before a stage's completion request is sent.
    ///
    /// # Arguments
    /// * `stage`   — 1-indexed stage number
    /// * `total`   — number of stages
    /// * `persona` — persona name of the stage
    fn on_stage_start(&self, stage: usize, total: usize, persona: &str) {
        let _ = (stage, total, persona);
    }

    /// Called when a stage produced text.
    fn on_stage_complete(&self, stage: usize, total: usize, output_len: usize) {
        let _ = (stage, total, output_len);
    }

    /// Called when a stage failed. No further stages run after this.
    fn on_stage_error(&self, stage: usize, total: usize, error: &str) {
        let _ = (stage, total, error);
    }

    /// Called once after the run ends, successfully or not.
    fn on_pipeline_complete(&self, total_stages: usize, completed_stages: usize) {
        let _ = (total_stages, completed_stages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::HelperConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
