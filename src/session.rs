//! Per-session result storage for the presentation layer.
//!
//! The core never caches anything between calls. A front end that wants to
//! show "the last generated prompt" (and let the user edit and download it)
//! keeps it here, keyed by [`Feature`].

use crate::error::ExportError;
use crate::export::DocumentExporter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three user-facing features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Prompt,
    Analysis,
    Crew,
}

impl Feature {
    /// Title of the exported PDF.
    pub fn document_title(self) -> &'static str {
        match self {
            Feature::Prompt => "AI Art Prompt",
            Feature::Analysis => "Art Style Report",
            Feature::Crew => "Creative Workflow Report",
        }
    }

    /// Deterministic download file name.
    pub fn file_name(self) -> &'static str {
        match self {
            Feature::Prompt => "ai_art_prompt.pdf",
            Feature::Analysis => "art_style_report.pdf",
            Feature::Crew => "creative_workflow.pdf",
        }
    }

    /// Session key of the last result.
    pub fn session_key(self) -> &'static str {
        match self {
            Feature::Prompt => "last prompt result",
            Feature::Analysis => "last analysis result",
            Feature::Crew => "last crew result",
        }
    }
}

/// Last result per feature, owned by one user session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    results: HashMap<Feature, String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the last result for `feature`.
    pub fn record(&mut self, feature: Feature, text: impl Into<String>) {
        self.results.insert(feature, text.into());
    }

    pub fn last(&self, feature: Feature) -> Option<&str> {
        self.results.get(&feature).map(String::as_str)
    }

    /// Replace the stored text after the user edited it.
    ///
    /// Returns `false` (and stores nothing) when there is no result to edit.
    pub fn edit(&mut self, feature: Feature, text: impl Into<String>) -> bool {
        match self.results.get_mut(&feature) {
            Some(slot) => {
                *slot = text.into();
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, feature: Feature) {
        self.results.remove(&feature);
    }

    /// Render the stored result for `feature` as a PDF.
    ///
    /// `None` when nothing has been recorded for that feature yet.
    pub fn export(&self, feature: Feature) -> Option<Result<Vec<u8>, ExportError>> {
        self.last(feature)
            .map(|body| DocumentExporter::default().export(feature.document_title(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_have_distinct_file_names() {
        let names = [
            Feature::Prompt.file_name(),
            Feature::Analysis.file_name(),
            Feature::Crew.file_name(),
        ];
        assert_eq!(names[0], "ai_art_prompt.pdf");
        assert_eq!(names[1], "art_style_report.pdf");
        assert_ne!(names[2], names[0]);
        assert_ne!(names[2], names[1]);
    }

    #[test]
    fn record_and_edit() {
        let mut s = Session::new();
        assert!(s.last(Feature::Prompt).is_none());
        assert!(!s.edit(Feature::Prompt, "x"));

        s.record(Feature::Prompt, "first");
        assert!(s.edit(Feature::Prompt, "edited"));
        assert_eq!(s.last(Feature::Prompt), Some("edited"));

        // Features are independent.
        assert!(s.last(Feature::Analysis).is_none());
        s.clear(Feature::Prompt);
        assert!(s.last(Feature::Prompt).is_none());
    }

    #[test]
    fn export_only_when_recorded() {
        let mut s = Session::new();
        assert!(s.export(Feature::Analysis).is_none());
        s.record(Feature::Analysis, "Impressionist brushwork");
        let pdf = s.export(Feature::Analysis).unwrap().unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
