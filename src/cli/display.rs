// Transcript output
//
// Everything the chat prints goes through here so it can be written to any
// `Write` (stdout in the binary, a Vec<u8> in tests).

use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::render::{render_with_border, BORDER};
use crate::turn::ResponseMeta;

const AGENT_NAME: &str = "Kramer";
const HEADER_RULE_WIDTH: usize = 56;

pub fn header(out: &mut dyn Write, sandbox: &str, model: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {} {}",
        "◆ OpenClaw PM Agent".cyan(),
        format!("{} • {}", sandbox, model).dark_grey()
    )?;
    writeln!(out, "  {}", "─".repeat(HEADER_RULE_WIDTH).dark_grey())?;
    writeln!(out)
}

pub fn welcome(out: &mut dyn Write) -> io::Result<()> {
    agent_label(out)?;
    writeln!(out, "  {}", BORDER.dark_grey())?;
    writeln!(out, "  {} What are we working on today?", BORDER.dark_grey())?;
    writeln!(out)
}

fn agent_label(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "  {}", format!("● {}", AGENT_NAME).cyan())
}

/// Input prompt, already styled
pub fn prompt() -> String {
    format!("  {} ", "▶".green())
}

/// Render an agent reply inside the bordered block
pub fn agent_message(out: &mut dyn Write, text: &str) -> io::Result<()> {
    agent_label(out)?;
    let border = BORDER.dark_grey().to_string();
    for line in render_with_border(text, &border) {
        writeln!(out, "  {}", line)?;
    }
    writeln!(out)
}

pub fn copy_hint(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        "copy: /copy (clean text) · /copy-md (markdown)".blue()
    )
}

pub fn warning(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "  {}", format!("⚠️  {}", message).yellow())
}

pub fn error(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "  {}", message.red())
}

pub fn success(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "  {}", format!("✅ {}", message).green())
}

pub fn plain(out: &mut dyn Write, text: &str) -> io::Result<()> {
    for line in text.lines() {
        writeln!(out, "  {}", line)?;
    }
    writeln!(out)
}

/// Model and duration from the response envelope (debug only)
pub fn debug_meta(out: &mut dyn Write, meta: ResponseMeta<'_>) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", "───".dark_grey())?;
    if let Some(model) = meta.model() {
        writeln!(out, "  {}", format!("Model: {}", model).dark_grey())?;
    }
    if let Some(duration) = meta.duration_label() {
        writeln!(out, "  {}", format!("Duration: {}", duration).dark_grey())?;
    }
    Ok(())
}
