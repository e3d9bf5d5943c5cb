// Marker tables for artifact detection
//
// Two separate tables on purpose: EXTRACT_MARKERS decides where a document
// starts when copying, ARTIFACT_HINT_MARKERS only decides whether the copy
// hint is worth showing and so also accepts plain bullet lists.

use once_cell::sync::Lazy;
use regex::Regex;

/// A named pattern; position in its table is the tie-break priority
pub struct Marker {
    pub name: &'static str,
    pub pattern: Regex,
}

fn compile(table: &[(&'static str, &str)]) -> Vec<Marker> {
    table
        .iter()
        .map(|&(name, pattern)| Marker {
            name,
            pattern: Regex::new(pattern).expect("marker pattern must compile"),
        })
        .collect()
}

/// Where a document starts inside a conversational reply
pub static EXTRACT_MARKERS: Lazy<Vec<Marker>> = Lazy::new(|| {
    compile(&[
        ("heading", r"(?im)^#{1,6}[ \t]+.+$"),
        ("pitch", r"(?im)^(?:Project[ \t]+)?Pitch:.+$"),
        ("prd", r"(?im)^PRD:.+$"),
        ("product-requirements", r"(?im)^Product[ \t]+Requirements"),
        ("problem", r"(?im)^#{1,6}[ \t]*(?:The[ \t]+)?Problem"),
        ("outline", r"(?im)^(?:#{1,6}[ \t]*)?1\.[ \t]+\S"),
    ])
});

/// Anything that looks structured enough to be worth copying
pub static ARTIFACT_HINT_MARKERS: Lazy<Vec<Marker>> = Lazy::new(|| {
    compile(&[
        ("heading", r"(?m)^#{1,6}[ \t]+.+$"),
        ("document-title", r"(?mi)^(?:Project[ \t]+Pitch|PRD|Product[ \t]+Requirements)"),
        ("jtbd", r"(?mi)^(?:The[ \t]+(?:Core[ \t]+)?Job|Job[ \t]+Map)"),
        ("numbered-section", r"(?m)^\d+\.[ \t]+\w+"),
        ("star-bullet", r"(?m)^\*[ \t]+"),
        ("bullet", r"(?m)^(?:-[ \t]+|•[ \t]+)"),
    ])
});

/// Closing offers and questions appended after the real content
pub static FLUFF_MARKERS: Lazy<Vec<Marker>> = Lazy::new(|| {
    compile(&[
        ("would-you-like", r"(?i)\n\s*Would you like"),
        ("let-me-know", r"(?i)\n\s*Let me know if"),
        ("does-this-help", r"(?i)\n\s*Does this help"),
        ("what-do-you-think", r"(?i)\n\s*What do you think"),
        ("shall-i", r"(?i)\n\s*Shall I"),
        ("feel-free", r"(?i)\n\s*Feel free to"),
    ])
});

/// Earliest match across a table; equal offsets go to the earlier entry
pub fn earliest<'a>(markers: &'a [Marker], text: &str) -> Option<(usize, &'a Marker)> {
    markers
        .iter()
        .enumerate()
        .filter_map(|(priority, marker)| {
            marker
                .pattern
                .find(text)
                .map(|found| (found.start(), priority, marker))
        })
        .min_by_key(|(start, priority, _)| (*start, *priority))
        .map(|(start, _, marker)| (start, marker))
}
