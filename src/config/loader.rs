// Configuration loader
// Loads chat defaults from ~/.kramer/config.toml; a missing file means defaults

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::CONFIG_DIR_NAME;
use super::settings::Config;

/// `~/.kramer/config.toml`, if a home directory exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist. The default location is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            read_config(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path)?,
            _ => {
                tracing::debug!("No config file, using defaults");
                Config::default()
            }
        },
    };

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn read_config(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::ThinkingLevel;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("thinking = \"high\"\ndebug = true\n");
        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.thinking, ThinkingLevel::High);
        assert!(config.debug);
        assert_eq!(config.session, "tui");
        assert_eq!(config.remote_exec, "sprite exec");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let file = write_config("timeout_secs = 0\n");
        assert!(load_config(Some(file.path())).is_err());

        let file = write_config("thinking = \"extreme\"\n");
        assert!(load_config(Some(file.path())).is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
