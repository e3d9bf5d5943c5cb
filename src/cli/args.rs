// Command-line arguments
// Flags override values from the config file

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::turn::ThinkingLevel;

#[derive(Debug, Parser)]
#[command(name = "kramer", version, about = "Chat with your PM Agent")]
pub struct Args {
    /// Sprite name
    pub name: String,

    /// Session id (stored on the Sprite)
    #[arg(long)]
    pub session: Option<String>,

    /// Thinking level
    #[arg(long, value_enum)]
    pub thinking: Option<ThinkingLevel>,

    /// Timeout seconds per turn
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Disable the waiting spinner
    #[arg(long)]
    pub no_spinner: bool,

    /// Print extra diagnostics (stderr, exit codes, empty replies, metadata)
    #[arg(long)]
    pub debug: bool,

    /// Do not capture stdout/stderr; stream sprite output directly
    #[arg(long)]
    pub passthru: bool,

    /// Command used to run commands inside the sprite (default: "sprite exec")
    #[arg(long, value_name = "COMMAND")]
    pub remote_exec: Option<String>,

    /// Config file (default: ~/.kramer/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn apply(&self, config: &mut Config) {
        if let Some(session) = &self.session {
            config.session = session.clone();
        }
        if let Some(thinking) = self.thinking {
            config.thinking = thinking;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(remote_exec) = &self.remote_exec {
            config.remote_exec = remote_exec.clone();
        }
        if self.no_spinner {
            config.spinner = false;
        }
        if self.debug {
            config.debug = true;
        }
        if self.passthru {
            config.passthru = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = Args::try_parse_from(["kramer", "pm-agent"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config, Config::default());
        assert_eq!(args.name, "pm-agent");
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "kramer",
            "pm-agent",
            "--session",
            "work",
            "--thinking",
            "high",
            "--timeout",
            "90",
            "--no-spinner",
            "--debug",
            "--passthru",
        ])
        .unwrap();
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.session, "work");
        assert_eq!(config.thinking, ThinkingLevel::High);
        assert_eq!(config.timeout_secs, 90);
        assert!(!config.spinner);
        assert!(config.debug);
        assert!(config.passthru);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Args::try_parse_from(["kramer", "pm", "--thinking", "max"]).is_err());
        assert!(Args::try_parse_from(["kramer", "pm", "--timeout", "0"]).is_err());
        assert!(Args::try_parse_from(["kramer"]).is_err());
    }
}
