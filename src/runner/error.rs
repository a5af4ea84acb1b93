// Error types for Runner module
#![allow(dead_code)]

use thiserror::Error;

/// Runner error types
///
/// Everything after a successful spawn is reported inside `RunResult`,
/// not here; these variants all precede or replace the child process.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Command blocked by denylist pattern '{0}'")]
    Blocked(String),

    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
