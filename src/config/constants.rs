// Project-wide constants
//
// Centralised here so defaults and limits have one source of truth.
// Import via `use crate::config::constants::*;`.

/// Command line used to reach the sprite (`<remote-exec> -s <name> bash -s`)
pub const DEFAULT_REMOTE_EXEC: &str = "sprite exec";

/// Session id stored on the sprite when none is given.
pub const DEFAULT_SESSION_ID: &str = "tui";

/// Per-turn timeout handed to the remote agent, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// How often a running turn is checked for exit.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Sprite names are DNS-label shaped.
pub const MAX_SANDBOX_NAME_LEN: usize = 63;

/// Environment variable naming the sprite's primary model
pub const MODEL_ENV_VAR: &str = "OPENCLAW_MODEL_PRIMARY";

/// Config directory under $HOME
pub const CONFIG_DIR_NAME: &str = ".kramer";
