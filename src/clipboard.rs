// Clipboard export
//
// Best effort: shell out to the platform clipboard utility, falling back to
// arboard when none is installed. Failure is reported, never fatal.

use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard utility found (install xclip or xsel on Linux)")]
    Unavailable,

    #[error("{program} failed: {reason}")]
    Utility { program: String, reason: String },
}

/// Anything that can take text for the user's clipboard
pub trait ClipboardSink {
    /// Returns the name of the backend that accepted the text
    fn copy(&mut self, text: &str) -> Result<String, ClipboardError>;
}

/// A clipboard utility invocation: program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardUtility {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl ClipboardUtility {
    const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }
}

/// Utilities to try, in order, for the current platform
pub fn platform_utilities() -> Vec<ClipboardUtility> {
    if cfg!(target_os = "macos") {
        vec![ClipboardUtility::new("pbcopy", &[])]
    } else if cfg!(windows) {
        vec![ClipboardUtility::new("clip", &[])]
    } else {
        let mut utilities = Vec::new();
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            utilities.push(ClipboardUtility::new("wl-copy", &[]));
        }
        utilities.push(ClipboardUtility::new("xclip", &["-selection", "clipboard"]));
        utilities.push(ClipboardUtility::new("xsel", &["--clipboard", "--input"]));
        utilities
    }
}

/// The OS clipboard
pub struct SystemClipboard {
    utilities: Vec<ClipboardUtility>,
    // Kept alive for the session: on X11 the contents vanish with the owner
    fallback: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::with_utilities(platform_utilities())
    }

    pub fn with_utilities(utilities: Vec<ClipboardUtility>) -> Self {
        Self {
            utilities,
            fallback: None,
        }
    }

    fn copy_with_arboard(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fallback.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|e| {
                debug!("arboard unavailable: {}", e);
                ClipboardError::Unavailable
            })?;
            self.fallback = Some(clipboard);
        }

        let clipboard = self.fallback.as_mut().ok_or(ClipboardError::Unavailable)?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Utility {
                program: "arboard".to_string(),
                reason: e.to_string(),
            })
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<String, ClipboardError> {
        let mut last_error = None;

        for utility in &self.utilities {
            if which::which(utility.program).is_err() {
                debug!(program = utility.program, "clipboard utility not installed");
                continue;
            }
            match pipe_to(utility, text) {
                Ok(()) => return Ok(utility.program.to_string()),
                Err(e) => {
                    warn!("{}", e);
                    last_error = Some(e);
                }
            }
        }

        match self.copy_with_arboard(text) {
            Ok(()) => Ok("arboard".to_string()),
            Err(ClipboardError::Unavailable) => Err(last_error.unwrap_or(ClipboardError::Unavailable)),
            Err(e) => Err(e),
        }
    }
}

fn pipe_to(utility: &ClipboardUtility, text: &str) -> Result<(), ClipboardError> {
    let fail = |reason: String| ClipboardError::Utility {
        program: utility.program.to_string(),
        reason,
    };

    let mut child = Command::new(utility.program)
        .args(utility.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| fail(e.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| fail(e.to_string()))?;
    }

    let status = child.wait().map_err(|e| fail(e.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(fail(format!("exited with {}", status)))
    }
}
