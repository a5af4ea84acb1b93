// Error types for Tool module
#![allow(dead_code)]

use crate::runner::RunnerError;
use thiserror::Error;

/// Tool error types
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input for tool '{0}': {1}")]
    InvalidInput(String, String),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ToolError>;
