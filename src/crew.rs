//! The three-stage creative crew.
//!
//! A crew run is a fixed, ordered list of [`PipelineStage`]s consumed by a
//! single loop in [`SequentialPipeline::run`]:
//!
//! ```text
//! query ──▶ Art Director ──▶ Style Expert ──▶ Photographer ──▶ final text
//!           (concept)        (light/colour)   (camera/lens)
//! ```
//!
//! Every stage is one completion call. Stages never run concurrently; a
//! failing stage ends the run and drops every earlier output.
//!
//! ## Chaining
//!
//! With [`StageChaining::Chained`] (the default) each stage after the first
//! sees the previous stage's output as context, so the photographer refines
//! the style expert's text rather than inventing a new scene. With
//! [`StageChaining::Independent`] every stage only sees its own task, which
//! reproduces the bare task texts exactly.

use crate::completion::CompletionClient;
use crate::error::PipelineError;
use crate::progress::ProgressCallback;
use crate::prompts::{
    build_stage_prompt, render_task, CAMERA_EXPECTED, CAMERA_TASK, CONCEPT_EXPECTED,
    CONCEPT_TASK, ENHANCEMENT_EXPECTED, ENHANCEMENT_TASK,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default sampling temperature for crew stages.
pub const CREW_TEMPERATURE: f32 = 0.6;

/// Static descriptive metadata attached to a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub name: &'static str,
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

pub const ART_DIRECTOR: Persona = Persona {
    name: "Art Director",
    role: "Concept Creator",
    goal: "Turn the user's idea into a high-quality art concept.",
    backstory: "A seasoned art director specializing in cinematic visuals.",
};

pub const STYLE_EXPERT: Persona = Persona {
    name: "Style Expert",
    role: "Style Enhancer",
    goal: "Refine the concept with lighting, colors, mood, and references.",
    backstory: "Expert in modern and classical art styles.",
};

pub const PHOTOGRAPHER: Persona = Persona {
    name: "Photographer",
    role: "Camera Consultant",
    goal: "Add perfect camera, lens, framing, and realism settings.",
    backstory: "A world-class photographer with cinematic experience.",
};

/// One step of the crew: who works on it and what they are asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineStage {
    pub persona: Persona,
    /// Task template; `{query}` is replaced with the user's request.
    pub instruction: &'static str,
    pub expected_output: &'static str,
}

/// The concept → enhancement → camera stages, in order.
pub fn default_stages() -> [PipelineStage; 3] {
    [
        PipelineStage {
            persona: ART_DIRECTOR,
            instruction: CONCEPT_TASK,
            expected_output: CONCEPT_EXPECTED,
        },
        PipelineStage {
            persona: STYLE_EXPERT,
            instruction: ENHANCEMENT_TASK,
            expected_output: ENHANCEMENT_EXPECTED,
        },
        PipelineStage {
            persona: PHOTOGRAPHER,
            instruction: CAMERA_TASK,
            expected_output: CAMERA_EXPECTED,
        },
    ]
}

/// Whether a stage sees the previous stage's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StageChaining {
    /// Previous output is passed as context. (default)
    #[default]
    Chained,
    /// Each stage only sees its own task.
    Independent,
}

/// Text produced by one stage of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutput {
    /// 1-indexed stage number.
    pub stage: usize,
    pub persona: String,
    pub text: String,
}

/// Every stage output of one successful run, in stage order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineRun {
    pub stages: Vec<StageOutput>,
    pub duration_ms: u64,
}

impl PipelineRun {
    /// The externally visible result: the last stage's text.
    pub fn final_output(&self) -> &str {
        self.stages.last().map(|s| s.text.as_str()).unwrap_or("")
    }

    pub fn into_final_output(mut self) -> String {
        self.stages.pop().map(|s| s.text).unwrap_or_default()
    }
}

/// Runs the crew stages one after another against a [`CompletionClient`].
#[derive(Clone)]
pub struct SequentialPipeline {
    stages: [PipelineStage; 3],
    chaining: StageChaining,
    model: Option<String>,
    temperature: f32,
    progress: Option<ProgressCallback>,
}

impl Default for SequentialPipeline {
    fn default() -> Self {
        Self {
            stages: default_stages(),
            chaining: StageChaining::default(),
            model: None,
            temperature: CREW_TEMPERATURE,
            progress: None,
        }
    }
}

impl fmt::Debug for SequentialPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialPipeline")
            .field(
                "stages",
                &self.stages.iter().map(|s| s.persona.name).collect::<Vec<_>>(),
            )
            .field("chaining", &self.chaining)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn PipelineProgressCallback>"))
            .finish()
    }
}

impl SequentialPipeline {
    pub fn with_chaining(mut self, chaining: StageChaining) -> Self {
        self.chaining = chaining;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn chaining(&self) -> StageChaining {
        self.chaining
    }

    /// Run every stage in order for `query`.
    ///
    /// The role hint (if any, and not blank) is added to the first stage's
    /// task only. Returns every stage's text on success; on the first failing
    /// stage returns a [`PipelineError`] and nothing else.
    pub async fn run(
        &self,
        client: &CompletionClient,
        query: &str,
        role_hint: Option<&str>,
    ) -> Result<PipelineRun, PipelineError> {
        let start = Instant::now();
        let total = self.stages.len();
        info!("Crew run: {} stages, {:?}", total, self.chaining);

        if let Some(ref cb) = self.progress {
            cb.on_pipeline_start(total);
        }

        let mut outputs: Vec<StageOutput> = Vec::with_capacity(total);

        for (idx, stage) in self.stages.iter().enumerate() {
            let stage_num = idx + 1;
            let hint = if idx == 0 { role_hint } else { None };
            let task = render_task(stage.instruction, query, hint);

            let context = match self.chaining {
                StageChaining::Chained => outputs.last().map(|o| o.text.as_str()),
                StageChaining::Independent => None,
            };
            let prompt = build_stage_prompt(stage, &task, context);

            if let Some(ref cb) = self.progress {
                cb.on_stage_start(stage_num, total, stage.persona.name);
            }
            debug!(
                "Stage {}/{} ({}): prompt {} chars",
                stage_num,
                total,
                stage.persona.name,
                prompt.len()
            );

            let result = client
                .complete(&prompt, self.model.as_deref(), Some(self.temperature))
                .await;

            match result.into_result() {
                Ok(text) => {
                    if let Some(ref cb) = self.progress {
                        cb.on_stage_complete(stage_num, total, text.len());
                    }
                    outputs.push(StageOutput {
                        stage: stage_num,
                        persona: stage.persona.name.to_string(),
                        text,
                    });
                }
                Err(source) => {
                    warn!(
                        "Stage {}/{} ({}) failed — {}",
                        stage_num, total, stage.persona.name, source
                    );
                    if let Some(ref cb) = self.progress {
                        cb.on_stage_error(stage_num, total, &source.to_string());
                        cb.on_pipeline_complete(total, idx);
                    }
                    return Err(PipelineError {
                        stage: stage_num,
                        persona: stage.persona.name.to_string(),
                        source,
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("Crew run complete in {}ms", duration_ms);

        if let Some(ref cb) = self.progress {
            cb.on_pipeline_complete(total, outputs.len());
        }

        Ok(PipelineRun {
            stages: outputs,
            duration_ms,
        })
    }
}
