// Data types for Runner module
#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

/// A single external-command execution request.
///
/// Immutable once constructed; `None` fields fall back to the
/// `RunnerConfig` defaults at run time.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Program and arguments, argv-style
    pub command: Vec<String>,
    /// Working directory for the child process
    pub working_dir: Option<PathBuf>,
    /// Wall-clock timeout override in seconds
    pub timeout_secs: Option<u64>,
    /// Captured-output ceiling override in bytes
    pub output_limit_bytes: Option<usize>,
    /// When set, full output goes to this file instead of memory
    pub output_file: Option<PathBuf>,
}

impl Invocation {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            working_dir: None,
            timeout_secs: None,
            output_limit_bytes: None,
            output_file: None,
        }
    }
}

/// Outcome of one invocation
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Child exit code; `-1` is the timeout sentinel, `128 + signal`
    /// marks a signal death on Unix
    pub exit_code: i32,
    /// Combined stdout/stderr, capped at the output limit
    /// (empty when the invocation redirected output to a file)
    pub output: Vec<u8>,
    /// True if the child produced more output than the limit
    pub truncated: bool,
    /// True if the deadline fired before the child exited
    pub timed_out: bool,
    /// Wall-clock duration of the call
    pub duration: Duration,
}

impl RunResult {
    /// Captured output as text, lossily decoded
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).to_string()
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}
