//! Post-processing: deterministic cleanup of model-generated text.
//!
//! Chat models occasionally wrap an answer in a ```` ```markdown ```` fence,
//! use `\r\n` line endings, or leave zero-width characters behind. None of
//! that should reach the user or the PDF, so every successful completion
//! passes through [`clean_response`] when `HelperConfig::clean_output` is on.
//!
//! ## Rule Order
//!
//! Fences are stripped first so the remaining rule sees the real content.
//! Everything else happens in a single line-by-line pass over the reply.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Strip an outer markdown/text fence wrapping the whole answer
/// 2. Tidy the reply line by line: any line break style, no invisible
///    formatting characters, no trailing spaces, and paragraphs separated by
///    at most one blank line
/// 3. Trim leading/trailing blank space of the whole text
pub fn clean_response(input: &str) -> String {
    let s = strip_outer_fence(input);
    tidy_paragraphs(&s).trim().to_string()
}

// ── Rule 1: Strip outer fence ────────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:markdown|md|text|plaintext)?[ \t]*\r?\n(.*?)\r?\n```\s*$").unwrap()
});

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        // Only unwrap when the fence really wraps everything: no inner fences.
        Some(caps) if !caps[1].contains("```") => caps[1].to_string(),
        _ => input.to_string(),
    }
}

// ── Rule 2: Tidy paragraphs ──────────────────────────────────────────────────

/// Zero-width and formatting characters chat models leak into replies.
const INVISIBLE: [char; 6] = [
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}',
];

/// Blank lines allowed between two paragraphs.
const PARAGRAPH_GAP: usize = 1;

fn tidy_paragraphs(input: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut blank_run = 0;

    // `str::lines` handles "\r\n"; a lone '\r' is a break too.
    for raw in input.lines().flat_map(|l| l.split('\r')) {
        let line: String = raw.chars().filter(|c| !INVISIBLE.contains(c)).collect();
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > PARAGRAPH_GAP {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line.to_string());
    }
    out.join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        let input = "```markdown\n**Prompt:** a fox\nin snow\n```";
        assert_eq!(strip_outer_fence(input), "**Prompt:** a fox\nin snow");
    }

    #[test]
    fn test_strip_fences_no_lang() {
        assert_eq!(strip_outer_fence("```\nHello\n```"), "Hello");
    }

    #[test]
    fn test_inner_code_fence_kept() {
        let input = "```\nsettings:\n```\n\ntext\n\n```\nmore\n```";
        assert_eq!(strip_outer_fence(input), input);
    }

    #[test]
    fn test_no_fences_passthrough() {
        assert_eq!(strip_outer_fence("plain answer"), "plain answer");
    }

    #[test]
    fn test_paragraphs_keep_one_gap() {
        let reply = "Lighting: golden hour\n\n\n\nPalette: amber, teal\nMood: wistful";
        assert_eq!(
            tidy_paragraphs(reply),
            "Lighting: golden hour\n\nPalette: amber, teal\nMood: wistful"
        );
    }

    #[test]
    fn test_windows_and_old_mac_breaks() {
        assert_eq!(tidy_paragraphs("Scene\r\nLens\rMood"), "Scene\nLens\nMood");
        // A CRLF pair is one break, so it never opens a blank line.
        assert_eq!(tidy_paragraphs("a\r\n\r\nb"), "a\n\nb");
    }

    #[test]
    fn test_indent_kept_trailing_spaces_dropped() {
        assert_eq!(
            tidy_paragraphs("  - 35mm lens   \n  - f/1.8\t"),
            "  - 35mm lens\n  - f/1.8"
        );
    }

    #[test]
    fn test_invisible_formatting_dropped() {
        let reply = "water\u{200B}colour\u{FEFF} wash, soft\u{00AD}focus";
        assert_eq!(tidy_paragraphs(reply), "watercolour wash, softfocus");
    }

    #[test]
    fn test_line_of_only_invisibles_counts_as_blank() {
        assert_eq!(tidy_paragraphs("a\n\n\u{200B}\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_clean_response_full_pipeline() {
        let input = "```markdown\nCinematic shot\r\n\r\nLens: 35mm   \n\n\n\n\n\nMood: calm\u{200B}\n```\n";
        let result = clean_response(input);
        assert_eq!(result, "Cinematic shot\n\nLens: 35mm\n\nMood: calm");
    }
}
