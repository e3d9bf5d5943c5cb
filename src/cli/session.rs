// Chat session loop
//
// AwaitingInput → ProcessingTurn → AwaitingInput until /exit, /quit or end
// of input. All mutable state lives in SessionState, owned by Session, so a
// turn can be driven in tests with a fake runner and an in-memory writer.

use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::commands::{format_help, Command};
use super::display;
use super::input::LineSource;
use crate::artifact::{extract, has_artifact};
use crate::clipboard::ClipboardSink;
use crate::config::Config;
use crate::render::strip_markdown;
use crate::turn::{
    ParsedResponse, ProgressSink, ThinkingLevel, TurnError, TurnExecutor, TurnMode, TurnOutput,
    TurnRequest, TurnResult,
};

/// Runs one turn against the agent
#[async_trait(?Send)]
pub trait TurnRunner {
    async fn run_turn(
        &mut self,
        request: &TurnRequest,
        mode: TurnMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<TurnOutput, TurnError>;
}

#[async_trait(?Send)]
impl TurnRunner for TurnExecutor {
    async fn run_turn(
        &mut self,
        request: &TurnRequest,
        mode: TurnMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<TurnOutput, TurnError> {
        self.execute(request, mode, progress).await
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LastResponse {
    display_text: String,
    raw_text: String,
}

/// What the copy commands work from. Both texts are stored together, so
/// they are always either both present or both absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    last: Option<LastResponse>,
    hint_shown: bool,
}

impl SessionState {
    pub fn last_display_text(&self) -> Option<&str> {
        self.last.as_ref().map(|last| last.display_text.as_str())
    }

    pub fn last_raw_text(&self) -> Option<&str> {
        self.last.as_ref().map(|last| last.raw_text.as_str())
    }

    pub fn hint_shown(&self) -> bool {
        self.hint_shown
    }

    pub fn remember(&mut self, display_text: impl Into<String>, raw_text: impl Into<String>) {
        self.last = Some(LastResponse {
            display_text: display_text.into(),
            raw_text: raw_text.into(),
        });
    }

    /// True exactly once: the first time a reply carries an artifact
    pub fn take_hint(&mut self, text: &str) -> bool {
        if self.hint_shown || !has_artifact(text) {
            return false;
        }
        self.hint_shown = true;
        true
    }
}

/// Per-turn settings that do not change during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub session_id: String,
    pub thinking: ThinkingLevel,
    pub timeout_secs: u64,
    pub debug: bool,
    pub passthru: bool,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            session_id: config.session.clone(),
            thinking: config.thinking,
            timeout_secs: config.timeout_secs,
            debug: config.debug,
            passthru: config.passthru,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Exit(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyFormat {
    Clean,
    Markdown,
}

pub struct Session<R, C, W> {
    runner: R,
    clipboard: C,
    out: W,
    progress: Box<dyn ProgressSink>,
    options: SessionOptions,
    state: SessionState,
}

impl<R, C, W> Session<R, C, W>
where
    R: TurnRunner,
    C: ClipboardSink,
    W: Write,
{
    pub fn new(
        runner: R,
        clipboard: C,
        out: W,
        progress: Box<dyn ProgressSink>,
        options: SessionOptions,
    ) -> Self {
        Self {
            runner,
            clipboard,
            out,
            progress,
            options,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read and handle lines until the session terminates; returns the exit code
    pub async fn run(&mut self, input: &mut dyn LineSource) -> Result<i32> {
        let prompt = display::prompt();
        loop {
            let Some(line) = input.read_line(&prompt)? else {
                debug!("input closed");
                return Ok(0);
            };
            if let Transition::Exit(code) = self.handle_line(&line).await? {
                return Ok(code);
            }
        }
    }

    /// One step of the loop
    pub async fn handle_line(&mut self, line: &str) -> Result<Transition> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Transition::Continue);
        }

        match Command::parse(line) {
            Some(Command::Quit) => return Ok(Transition::Exit(0)),
            Some(Command::Copy) => self.copy_last(CopyFormat::Clean)?,
            Some(Command::CopyMarkdown) => self.copy_last(CopyFormat::Markdown)?,
            Some(Command::Help) => display::plain(&mut self.out, &format_help())?,
            None => {
                writeln!(self.out)?;
                self.process_turn(line).await?;
            }
        }

        self.out.flush()?;
        Ok(Transition::Continue)
    }

    async fn process_turn(&mut self, message: &str) -> Result<()> {
        let request = TurnRequest::new(
            message,
            self.options.session_id.as_str(),
            self.options.thinking,
            self.options.timeout_secs,
        );
        let mode = if self.options.passthru {
            TurnMode::Passthrough
        } else {
            TurnMode::Capture
        };

        let output = self
            .runner
            .run_turn(&request, mode, self.progress.as_mut())
            .await;

        match output {
            Ok(TurnOutput::Captured(result)) => self.show_result(&result)?,
            Ok(TurnOutput::Streamed { exit_code }) => {
                writeln!(self.out)?;
                if exit_code != 0 && self.options.debug {
                    display::error(&mut self.out, &format!("Error (exit {})", exit_code))?;
                }
            }
            Err(e) => {
                warn!("turn failed: {}", e);
                display::error(&mut self.out, &format!("❌ {}", e))?;
            }
        }
        Ok(())
    }

    fn show_result(&mut self, result: &TurnResult) -> Result<()> {
        let parsed = ParsedResponse::classify(result);
        debug!(structured = parsed.is_structured, "classified response");

        if !parsed.is_empty() {
            self.state
                .remember(parsed.display_text.as_str(), parsed.raw_text.as_str());
            display::agent_message(&mut self.out, &parsed.display_text)?;

            if self.state.take_hint(&parsed.display_text) {
                display::copy_hint(&mut self.out)?;
            }

            if self.options.debug {
                if let Some(meta) = parsed.meta() {
                    display::debug_meta(&mut self.out, meta)?;
                }
            }
        } else if self.options.debug {
            display::warning(&mut self.out, "No response received")?;
        }

        if self.options.debug {
            let stderr = result.stderr.trim();
            if !stderr.is_empty() {
                display::error(&mut self.out, stderr)?;
            }
            if !result.success() {
                display::error(&mut self.out, &format!("Error (exit {})", result.exit_code))?;
            }
        }
        Ok(())
    }

    fn copy_last(&mut self, format: CopyFormat) -> Result<()> {
        let source = match format {
            CopyFormat::Clean => self.state.last_display_text(),
            CopyFormat::Markdown => self.state.last_raw_text(),
        };
        let Some(source) = source else {
            display::warning(&mut self.out, "No response to copy yet")?;
            return Ok(());
        };

        let artifact = extract(source);
        let artifact = match format {
            CopyFormat::Clean => strip_markdown(&artifact),
            CopyFormat::Markdown => artifact,
        };

        match self.clipboard.copy(&artifact) {
            Ok(backend) => {
                debug!(backend = %backend, bytes = artifact.len(), "copied artifact");
                let message = match format {
                    CopyFormat::Clean => "Copied artifact to clipboard",
                    CopyFormat::Markdown => "Copied markdown artifact to clipboard",
                };
                display::success(&mut self.out, message)?;
            }
            Err(e) => {
                display::warning(&mut self.out, &format!("Could not copy to clipboard: {}", e))?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }
}
