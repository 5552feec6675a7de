//! Prompt templates for every completion the library sends.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — rewording an instruction or a persona
//!    requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can import and inspect prompts directly
//!    without calling a model, making prompt regressions easy to catch.
//!
//! All builders are pure: identical inputs always produce byte-identical
//! prompts.

use crate::crew::PipelineStage;

/// Instruction prefixed to the user's description by [`build_art_prompt`].
pub const ART_PROMPT_INSTRUCTION: &str = "You are an expert AI art prompt engineer. \
Generate a high-quality prompt with cinematic details, camera setup, \
lighting, mood, color palette, realism level, and composition.";

/// Instruction prefixed to the artwork description by [`build_style_analysis_prompt`].
pub const STYLE_ANALYSIS_INSTRUCTION: &str = "You are a professional art critic. \
Analyze the description and explain style, genre, lighting, color theory, \
emotion, composition, and improvements.";

/// Build the single-shot art prompt request.
///
/// Layout: instruction, blank line, `Description: …`, `Style: …`. The style
/// label is emitted even when `style` is empty.
pub fn build_art_prompt(description: &str, style: &str) -> String {
    format!(
        "{}\n\nDescription: {}\nStyle: {}",
        ART_PROMPT_INSTRUCTION, description, style
    )
}

/// Build the single-shot style analysis request.
pub fn build_style_analysis_prompt(description: &str) -> String {
    format!("{}\n\nArtwork: {}", STYLE_ANALYSIS_INSTRUCTION, description)
}

// ── Crew stages ──────────────────────────────────────────────────────────

/// Stage 1 task. `{query}` is replaced with the user's request verbatim by
/// [`render_task`].
pub const CONCEPT_TASK: &str = "Create the core concept based on the user request: {query}";
pub const CONCEPT_EXPECTED: &str =
    "A detailed concept with scene, subject, mood, and artistic idea.";

pub const ENHANCEMENT_TASK: &str =
    "Enhance the concept with lighting, color palette, style, and mood.";
pub const ENHANCEMENT_EXPECTED: &str =
    "A refined artistic style with detailed visual improvements.";

pub const CAMERA_TASK: &str = "Add camera, lens, frame, angle, and composition enhancements.";
pub const CAMERA_EXPECTED: &str = "Perfect camera settings and cinematography instructions.";

/// Render a stage task: `{query}` becomes the user's request and a
/// non-blank role hint is appended as a perspective line.
pub fn render_task(template: &str, query: &str, role_hint: Option<&str>) -> String {
    let mut task = template.replace("{query}", query);
    if let Some(hint) = role_hint.map(str::trim).filter(|h| !h.is_empty()) {
        task.push_str(&format!("\nApproach it from the perspective of: {}.", hint));
    }
    task
}

/// Build the full prompt sent for one crew stage.
///
/// `task` is the stage's rendered instruction; `context` is the previous
/// stage's output when the pipeline chains stages.
pub fn build_stage_prompt(stage: &PipelineStage, task: &str, context: Option<&str>) -> String {
    let persona = &stage.persona;
    let mut prompt = format!(
        "You are {}, the {}. {}\nYour goal: {}\n\nCurrent task: {}\n\nExpected output: {}",
        persona.name, persona.role, persona.backstory, persona.goal, task, stage.expected_output
    );

    if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n\nWork from this result of the previous step:\n\"\"\"\n");
        prompt.push_str(ctx);
        prompt.push_str("\n\"\"\"");
    }

    prompt.push_str("\n\nReturn the complete result, not a summary.");
    prompt
}
