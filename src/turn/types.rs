// Turn data types
// Request sent to the sprite and the raw result collected from it

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How much reasoning the remote agent should spend on a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    Off,
    Minimal,
    #[default]
    Low,
    Medium,
    High,
}

impl ThinkingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThinkingLevel::Off => "off",
            ThinkingLevel::Minimal => "minimal",
            ThinkingLevel::Low => "low",
            ThinkingLevel::Medium => "medium",
            ThinkingLevel::High => "high",
        }
    }
}

impl fmt::Display for ThinkingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThinkingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(ThinkingLevel::Off),
            "minimal" => Ok(ThinkingLevel::Minimal),
            "low" => Ok(ThinkingLevel::Low),
            "medium" => Ok(ThinkingLevel::Medium),
            "high" => Ok(ThinkingLevel::High),
            other => Err(format!(
                "unknown thinking level '{}' (expected off|minimal|low|medium|high)",
                other
            )),
        }
    }
}

/// One user turn. Built fresh for every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub message: String,
    pub session_id: String,
    pub thinking: ThinkingLevel,
    pub timeout_secs: u64,
}

impl TurnRequest {
    pub fn new(
        message: impl Into<String>,
        session_id: impl Into<String>,
        thinking: ThinkingLevel,
        timeout_secs: u64,
    ) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
            thinking,
            // Zero would make the remote agent give up immediately
            timeout_secs: timeout_secs.max(1),
        }
    }
}

/// Everything the child process produced for one captured turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub wall_clock_secs: f64,
}

impl TurnResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Whether output is collected for rendering or streamed straight to the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnMode {
    Capture,
    Passthrough,
}

/// Outcome of a turn that managed to start
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutput {
    Captured(TurnResult),
    /// Output already went to the terminal; only the exit code is known
    Streamed { exit_code: i32 },
}
