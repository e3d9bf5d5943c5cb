// Artifact extraction
//
// Pulls the document (PRD, pitch, outline...) out of a conversational reply
// for the copy commands. Heuristic only: a stray "1. " early in chatty text
// will start the artifact there.

mod markers;

use markers::{earliest, ARTIFACT_HINT_MARKERS, EXTRACT_MARKERS, FLUFF_MARKERS};

/// Return the substantive document inside `text`.
///
/// The artifact runs from the earliest extraction marker to the end of the
/// text (or is the whole text when there is none), minus any trailing fluff,
/// trimmed. Applying it twice gives the same result as applying it once.
pub fn extract(text: &str) -> String {
    let text = text.trim();
    let start = artifact_start(text).unwrap_or(0);
    strip_trailing_fluff(&text[start..])
}

/// Byte offset where the artifact begins, if any marker matched
pub fn artifact_start(text: &str) -> Option<usize> {
    earliest(&EXTRACT_MARKERS, text).map(|(start, marker)| {
        tracing::debug!(marker = marker.name, start, "artifact marker found");
        start
    })
}

/// Drop the first closing offer/question paragraph and everything after it
pub fn strip_trailing_fluff(text: &str) -> String {
    let end = earliest(&FLUFF_MARKERS, text)
        .map(|(start, _)| start)
        .unwrap_or(text.len());
    text[..end].trim().to_string()
}

/// Whether a reply looks like it carries something worth copying
pub fn has_artifact(text: &str) -> bool {
    ARTIFACT_HINT_MARKERS
        .iter()
        .any(|marker| marker.pattern.is_match(text))
}
