// Markdown → terminal text
//
// Not a markdown parser: just enough stripping, table flattening and
// wrapping to make an agent reply readable inside the bordered transcript.

use once_cell::sync::Lazy;
use regex::Regex;

/// Left border drawn in front of every transcript line
pub const BORDER: &str = "│";

/// Maximum content width after the border
pub const WRAP_WIDTH: usize = 65;

/// Table descriptions longer than this are cut down
const TABLE_DESC_MAX: usize = 50;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("markdown pattern must compile")
}

static HORIZONTAL_RULE: Lazy<Regex> = Lazy::new(|| regex(r"(?m)^[ \t]*[-*]{3,}[ \t]*$"));
static HEADING: Lazy<Regex> = Lazy::new(|| regex(r"(?m)^#{1,6}[ \t]+"));
static BOLD: Lazy<Regex> = Lazy::new(|| regex(r"\*\*(.*?)\*\*"));
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| regex(r"(?m)^>[ \t]?"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| regex(r"`([^`\n]+)`"));
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| regex(r"```\w*\n?"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| regex(r"\n{3,}"));

/// Remove markdown markers, keeping the text they decorate
pub fn strip_markdown(text: &str) -> String {
    let text = HORIZONTAL_RULE.replace_all(text, "");
    let text = HEADING.replace_all(&text, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = strip_italic(&text);
    let text = BLOCKQUOTE.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = CODE_FENCE.replace_all(&text, "");
    collapse_blank_lines(&text).trim().to_string()
}

/// `*x*` → `x`, leaving bullet stars and `**` pairs alone
fn strip_italic(text: &str) -> String {
    text.split('\n')
        .map(strip_italic_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_italic_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while i < chars.len() {
        let opens = chars[i] == '*'
            && (i == 0 || chars[i - 1] != '*')
            && chars.get(i + 1).is_some_and(|c| !c.is_whitespace());

        if opens {
            let close = (i + 1..chars.len())
                .find(|&j| chars[j] == '*' && chars.get(j + 1) != Some(&'*'));
            if let Some(j) = close {
                out.extend(&chars[i + 1..j]);
                i = j + 1;
                continue;
            }
        }

        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Three or more newlines become a single blank line
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

/// Whether the text carries a markdown table worth flattening
pub fn looks_like_table(text: &str) -> bool {
    text.contains('|') && text.contains("---")
}

/// Flatten table rows into `• name: description` bullets
pub fn format_tables(text: &str) -> String {
    text.split('\n')
        .filter_map(|line| {
            if !line.contains('|') {
                return Some(line.to_string());
            }

            let inner = line.trim_matches(|c: char| c == '|' || c == ' ');
            if inner.contains("---") {
                return None;
            }

            let cells: Vec<&str> = inner.split('|').map(str::trim).collect();
            if cells.len() < 2 {
                return None;
            }

            let name = cells[0].trim_matches(|c: char| c == '*' || c == ' ');
            Some(format!("• {}: {}", name, truncate_description(cells[1])))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_description(desc: &str) -> String {
    if desc.chars().count() > TABLE_DESC_MAX {
        let kept: String = desc.chars().take(TABLE_DESC_MAX - 3).collect();
        format!("{}...", kept)
    } else {
        desc.to_string()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Greedy word wrap. Words are only split when one alone exceeds `width`.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if char_len(line) <= width {
        return vec![line.to_string()];
    }

    let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
    let mut lines = Vec::new();
    let mut current = if char_len(&indent) < width {
        indent
    } else {
        String::new()
    };
    let mut current_len = char_len(&current);
    let mut has_word = false;

    for word in line.split_whitespace() {
        for piece in split_long_word(word, width) {
            let piece_len = char_len(&piece);

            if has_word {
                if current_len + 1 + piece_len > width {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                } else {
                    current.push(' ');
                    current_len += 1;
                }
            } else if current_len + piece_len > width {
                // Indentation alone leaves no room for this word
                current.clear();
                current_len = 0;
            }

            current.push_str(&piece);
            current_len += piece_len;
            has_word = true;
        }
    }

    if has_word {
        lines.push(current);
    }

    lines
}

fn split_long_word(word: &str, width: usize) -> Vec<String> {
    if char_len(word) <= width {
        return vec![word.to_string()];
    }
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Render a reply into content lines without the border
pub fn render_body(text: &str) -> Vec<String> {
    let mut body = strip_markdown(text.trim());
    if looks_like_table(&body) {
        body = format_tables(&body);
    }
    let body = collapse_blank_lines(&body);

    let mut lines = Vec::new();
    for line in body.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrap_line(line, WRAP_WIDTH));
        }
    }
    lines
}

/// Render a reply into bordered transcript lines
pub fn render(text: &str) -> Vec<String> {
    render_with_border(text, BORDER)
}

/// Like [`render`], with a caller-supplied border (e.g. a styled `│`)
pub fn render_with_border(text: &str, border: &str) -> Vec<String> {
    render_body(text)
        .into_iter()
        .map(|line| {
            if line.is_empty() {
                border.to_string()
            } else {
                format!("{} {}", border, line)
            }
        })
        .collect()
}
