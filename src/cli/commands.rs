// Slash command handling

/// Built-in REPL commands. Anything else is sent to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// Copy the last artifact as clean text
    Copy,
    /// Copy the last artifact with markdown kept
    CopyMarkdown,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/help" => Some(Command::Help),
            "/quit" | "/exit" => Some(Command::Quit),
            "/copy" => Some(Command::Copy),
            "/copy-md" => Some(Command::CopyMarkdown),
            _ => None,
        }
    }
}

pub fn format_help() -> String {
    r#"Available commands:
  /copy      - Copy the last artifact as clean text
  /copy-md   - Copy the last artifact as markdown
  /help      - Show this help message
  /exit      - Exit the chat (also /quit)

Anything else is sent to the agent."#
        .to_string()
}
