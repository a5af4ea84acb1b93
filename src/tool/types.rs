// Data types for Tool module
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Tool descriptor handed to an inference backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "input_schema")]
    pub input_schema: serde_json::Value,
}

/// Output from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The text content from execution (stdout/stderr combined)
    pub content: String,
    /// Whether the execution resulted in an error (non-zero exit code or timeout)
    #[serde(default)]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}
