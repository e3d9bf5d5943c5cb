// Turn execution errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TurnError {
    /// The remote-exec binary could not be started at all
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program} to exit: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{key} cannot be passed through the shell (contains a NUL byte)")]
    Unquotable { key: String },
}

impl TurnError {
    /// True when no child process was ever created
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, TurnError::Spawn { .. } | TurnError::Unquotable { .. })
    }
}
