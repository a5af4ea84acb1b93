// Exec tool implementation
#![allow(dead_code)]

use crate::runner::{Invocation, Runner};
use crate::tool::error::{Result, ToolError};
use crate::tool::tool::ToolImpl;
use crate::tool::types::{ToolDefinition, ToolOutput};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Exec tool input parameters
#[derive(Debug, Deserialize)]
struct ExecInput {
    command: String,
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    working_dir: Option<PathBuf>,
}

/// Runs a shell command through the bounded runner
pub struct ExecTool {
    runner: Runner,
    description: String,
}

impl ExecTool {
    pub fn new(runner: Runner, description: impl Into<String>) -> Self {
        Self {
            runner,
            description: description.into(),
        }
    }
}

#[async_trait]
impl ToolImpl for ExecTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "exec".to_string(),
            description: self.description.clone(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The shell command to execute"
                    },
                    "timeout": {
                        "type": "integer",
                        "description": "Timeout in seconds for this call",
                        "minimum": 1,
                        "maximum": self.runner.config().max_timeout_secs
                    },
                    "working_dir": {
                        "type": "string",
                        "description": "Working directory for the command"
                    }
                },
                "required": ["command"]
            }),
        }
    }

    async fn run(&self, input: serde_json::Value) -> Result<ToolOutput> {
        let ExecInput {
            command,
            timeout,
            working_dir,
        } = serde_json::from_value(input)
            .map_err(|e| ToolError::InvalidInput("exec".to_string(), e.to_string()))?;

        debug!(command = %command, timeout = ?timeout, "executing shell command");

        let shell = self.runner.config().shell.clone();
        let timeout_secs = timeout.unwrap_or(self.runner.config().default_timeout_secs);
        let limit = self.runner.config().output_limit_bytes;

        let invocation = Invocation {
            timeout_secs: timeout,
            working_dir,
            ..Invocation::new(vec![shell, "-c".to_string(), command.clone()])
        };

        let result = self.runner.run(invocation).await?;

        // Build output string
        let mut content = result.output_lossy();

        if result.truncated {
            content.push_str(&format!("\n... (output truncated after {} bytes)", limit));
        }

        if result.timed_out {
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(&format!(
                "command timed out after {} seconds",
                timeout_secs
            ));
        }

        content.push_str(&format!("\n[exit_code]\n{}", result.exit_code));

        let is_error = result.timed_out || result.exit_code != 0;

        info!(
            command = %command.chars().take(100).collect::<String>(),
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            output_bytes = content.len(),
            is_error = is_error,
            "shell command executed"
        );

        Ok(ToolOutput { content, is_error })
    }
}

/// Default exec tool description
pub fn default_exec_description() -> String {
    r#"Execute a shell command via /bin/sh -c.
Stdout and stderr are captured together, capped at a fixed byte limit.
An optional timeout (seconds) bounds the call; the process is killed when it expires.
The exit code is appended to the output."#
        .to_string()
}
