// Configuration structs

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::*;
use crate::turn::ThinkingLevel;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Sprite name cannot be empty")]
    EmptySandboxName,

    #[error("Sprite name must be lowercase alphanumeric with hyphens only (e.g. pm-agent-test, not pm_agent_test)")]
    InvalidSandboxChars,

    #[error("Sprite name too long (max {max} characters)")]
    SandboxNameTooLong { max: usize },

    #[error("Sprite name cannot start or end with a hyphen")]
    SandboxNameHyphenEdge,

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    #[error("remote_exec must name a program (got {0:?})")]
    InvalidRemoteExec(String),
}

/// Chat settings, read from `~/.kramer/config.toml` and overridden by flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command line that runs a command inside a sprite, split shell-style
    pub remote_exec: String,

    /// Session id stored on the sprite
    pub session: String,

    /// Thinking level for every turn
    pub thinking: ThinkingLevel,

    /// Per-turn timeout enforced by the remote agent
    pub timeout_secs: u64,

    /// Animate the waiting spinner
    pub spinner: bool,

    /// Show stderr, exit codes, empty-reply warnings and response metadata
    pub debug: bool,

    /// Stream sprite output directly instead of capturing it
    pub passthru: bool,

    /// Liveness poll interval while a turn runs
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_exec: DEFAULT_REMOTE_EXEC.to_string(),
            session: DEFAULT_SESSION_ID.to_string(),
            thinking: ThinkingLevel::Low,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            spinner: true,
            debug: false,
            passthru: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        match shlex::split(&self.remote_exec) {
            Some(words) if !words.is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidRemoteExec(self.remote_exec.clone())),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Sprite names: lowercase alphanumerics and hyphens, at most 63 chars,
/// no hyphen at either end.
pub fn validate_sandbox_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::EmptySandboxName);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::InvalidSandboxChars);
    }
    if name.len() > MAX_SANDBOX_NAME_LEN {
        return Err(ConfigError::SandboxNameTooLong {
            max: MAX_SANDBOX_NAME_LEN,
        });
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(ConfigError::SandboxNameHyphenEdge);
    }
    Ok(())
}

/// Human label for the sprite's primary model (`default` when unset)
pub fn model_display_name(model: Option<&str>) -> String {
    let model = match model.map(str::trim) {
        Some(m) if !m.is_empty() => m,
        _ => return "default".to_string(),
    };

    match model {
        "sonnet" => "Claude Sonnet",
        "anthropic/claude-sonnet-4.5" | "openrouter/anthropic/claude-sonnet-4.5" => {
            "Claude Sonnet 4.5"
        }
        "haiku" => "Claude Haiku",
        "openrouter/openrouter/auto" => "Auto",
        other => other,
    }
    .to_string()
}
