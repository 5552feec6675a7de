//! Error types for the edgequake-art library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`CompletionError`] — **Displayable**: a single completion call could not
//!   produce text (no API key, a provider that could not be built, bad
//!   request, remote failure). It never aborts
//!   anything; it travels inside [`crate::completion::CompletionResult`] and is
//!   shown to the user as plain text.
//!
//! * [`PipelineError`] — **Displayable**: one crew stage failed, so the whole
//!   run is abandoned. Intermediate stage outputs are dropped with it.
//!
//! * [`ArtHelperError`] — **Rejected**: the action never started (empty
//!   required input, invalid configuration) or its artifact could not be
//!   produced (PDF export, file write). Returned as `Err(ArtHelperError)` from
//!   the entry points in [`crate::actions`].

use std::path::PathBuf;
use thiserror::Error;

/// Fixed text returned when no API key is configured.
pub const NOT_CONFIGURED_MESSAGE: &str = "Groq is not configured. Add GROQ_API_KEY in .env.";

/// A completion call that produced no text.
///
/// The `Display` output is what the user sees in place of the generated text,
/// so every variant renders as a self-contained sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum CompletionError {
    /// No credential is available for the completion service.
    #[error("{}", NOT_CONFIGURED_MESSAGE)]
    NotConfigured,

    /// A backend was requested (named provider, explicit key) but could not
    /// be built. `detail` carries the provider's own hint.
    #[error("{service} is not configured. {detail}")]
    Unavailable { service: String, detail: String },

    /// The request was rejected locally before any network call.
    #[error("Invalid completion request: {0}")]
    InvalidRequest(String),

    /// Network, HTTP, auth, quota or decoding failure from the remote service.
    #[error("{service} Error: {detail}")]
    Remote { service: String, detail: String },

    /// The service answered but returned no choices or empty content.
    #[error("{service} Error: response contained no generated text")]
    EmptyResponse { service: String },
}

/// A crew run that was abandoned because one of its stages failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Crew Error: stage {stage} ({persona}) failed: {source}")]
pub struct PipelineError {
    /// 1-indexed position of the failing stage.
    pub stage: usize,
    /// Display name of the stage persona.
    pub persona: String,
    #[source]
    pub source: CompletionError,
}

/// Which required input an action was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Description,
    Query,
}

impl InputField {
    /// The validation message shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            InputField::Description => "Please enter a description.",
            InputField::Query => "Please enter a question.",
        }
    }
}

/// PDF rendering failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The document title was the empty string.
    #[error("Document title must not be empty")]
    EmptyTitle,

    /// lopdf failed to serialise the document.
    #[error("Failed to encode PDF: {0}")]
    Encode(String),
}

/// All errors returned by the edgequake-art entry points.
#[derive(Debug, Error)]
pub enum ArtHelperError {
    // ── Validation ────────────────────────────────────────────────────────
    /// A required input was empty or whitespace-only. No network call was made.
    #[error("{}", .field.message())]
    EmptyInput { field: InputField },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The PDF could not be produced.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_is_fixed_text() {
        assert_eq!(
            CompletionError::NotConfigured.to_string(),
            "Groq is not configured. Add GROQ_API_KEY in .env."
        );
    }

    #[test]
    fn remote_error_carries_service_marker() {
        let e = CompletionError::Remote {
            service: "Groq".into(),
            detail: "401 invalid api key".into(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Groq Error: "), "got: {msg}");
        assert!(msg.contains("invalid api key"));
    }

    #[test]
    fn unavailable_names_the_service() {
        let e = CompletionError::Unavailable {
            service: "OpenAI".into(),
            detail: "OPENAI_API_KEY is not set".into(),
        };
        assert_eq!(
            e.to_string(),
            "OpenAI is not configured. OPENAI_API_KEY is not set"
        );
    }

    #[test]
    fn pipeline_error_display() {
        let e = PipelineError {
            stage: 2,
            persona: "Style Expert".into(),
            source: CompletionError::EmptyResponse {
                service: "Groq".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Crew Error: "), "got: {msg}");
        assert!(msg.contains("stage 2"));
        assert!(msg.contains("Style Expert"));
    }

    #[test]
    fn empty_input_messages() {
        let e = ArtHelperError::EmptyInput {
            field: InputField::Description,
        };
        assert_eq!(e.to_string(), "Please enter a description.");
        let e = ArtHelperError::EmptyInput {
            field: InputField::Query,
        };
        assert_eq!(e.to_string(), "Please enter a question.");
    }

    #[test]
    fn export_error_is_transparent() {
        let e: ArtHelperError = ExportError::EmptyTitle.into();
        assert_eq!(e.to_string(), "Document title must not be empty");
    }
}
