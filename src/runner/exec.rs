// Runner implementation
#![allow(dead_code)]

use crate::runner::config::RunnerConfig;
use crate::runner::denylist;
use crate::runner::error::{Result, RunnerError};
use crate::runner::types::{Invocation, RunResult};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Exit code reported when the deadline fires before the child exits.
/// Never produced by a normal exit: real codes are non-negative and
/// signal deaths map to `128 + signal`.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

const EXIT_CODE_SIGNAL_BASE: i32 = 128; // conventional shell: 128 + signal

// I/O buffer sizing
const READ_CHUNK_SIZE: usize = 8192; // bytes per read
const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Executes one external process per call with a bounded timeout and a
/// ceiling on captured output. Calls are independent; a Runner may be
/// shared freely across tasks.
pub struct Runner {
    config: RunnerConfig,
    extra_patterns: Vec<String>,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        let extra_patterns = config
            .denylist_path
            .as_deref()
            .map(|p| denylist::load_extra_patterns(p).unwrap_or_default())
            .unwrap_or_default();

        debug!(
            default_timeout_secs = config.default_timeout_secs,
            output_limit_bytes = config.output_limit_bytes,
            shell = %config.shell,
            extra_patterns = extra_patterns.len(),
            "initializing runner"
        );

        Self {
            config,
            extra_patterns,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute one invocation to completion.
    ///
    /// Always returns within the effective timeout plus scheduling slack.
    /// Spawn refusals surface as errors; everything after a successful
    /// spawn (non-zero exits, timeout, truncation) lands in the result.
    pub async fn run(&self, invocation: Invocation) -> Result<RunResult> {
        self.validate(&invocation)?;

        if let Some(pattern) = denylist::find_match(&invocation.command, &self.extra_patterns) {
            return Err(RunnerError::Blocked(pattern));
        }

        let timeout_secs = invocation
            .timeout_secs
            .unwrap_or(self.config.default_timeout_secs);
        let limit = invocation
            .output_limit_bytes
            .unwrap_or(self.config.output_limit_bytes);

        let (program, args) = invocation
            .command
            .split_first()
            .ok_or_else(|| RunnerError::InvalidArgument("command must be non-empty".to_string()))?;

        debug!(
            program = %program,
            timeout_secs,
            output_limit_bytes = limit,
            "spawning command"
        );

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }
        for key in &self.config.env_strip {
            cmd.env_remove(key);
        }

        let start = Instant::now();
        let child = cmd.spawn().map_err(|e| RunnerError::Spawn(e.to_string()))?;

        let mut sink = match &invocation.output_file {
            Some(path) => OutputSink::File {
                file: tokio::fs::File::create(path).await?,
                written: 0,
            },
            None => OutputSink::Memory {
                buf: Vec::with_capacity(limit.min(INITIAL_BUFFER_CAPACITY)),
                limit,
                truncated: false,
            },
        };

        let (exit_code, timed_out) =
            consume_output(child, Duration::from_secs(timeout_secs), &mut sink).await?;

        let duration = start.elapsed();
        let (output, truncated) = sink.finish().await?;

        info!(
            command = %invocation.command.join(" ").chars().take(100).collect::<String>(),
            exit_code,
            timed_out,
            truncated,
            output_bytes = output.len(),
            duration_ms = duration.as_millis() as u64,
            "command finished"
        );

        Ok(RunResult {
            exit_code,
            output,
            truncated,
            timed_out,
            duration,
        })
    }

    fn validate(&self, invocation: &Invocation) -> Result<()> {
        if invocation.command.is_empty() || invocation.command[0].is_empty() {
            return Err(RunnerError::InvalidArgument(
                "command must be non-empty".to_string(),
            ));
        }

        let timeout_secs = invocation
            .timeout_secs
            .unwrap_or(self.config.default_timeout_secs);
        if timeout_secs == 0 || timeout_secs > self.config.max_timeout_secs {
            return Err(RunnerError::InvalidArgument(format!(
                "timeout must be between 1 and {} seconds, got {}",
                self.config.max_timeout_secs, timeout_secs
            )));
        }

        let limit = invocation
            .output_limit_bytes
            .unwrap_or(self.config.output_limit_bytes);
        if limit == 0 {
            return Err(RunnerError::InvalidArgument(
                "output limit must be greater than zero".to_string(),
            ));
        }

        if let Some(dir) = &invocation.working_dir {
            if !dir.is_dir() {
                return Err(RunnerError::InvalidArgument(format!(
                    "working directory '{}' does not exist or is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}

/// Destination for combined child output.
///
/// The memory form stops accumulating at the limit but its writes stay
/// cheap no-ops past it, so the pipes keep draining and the child never
/// stalls on a full pipe.
enum OutputSink {
    Memory {
        buf: Vec<u8>,
        limit: usize,
        truncated: bool,
    },
    File {
        file: tokio::fs::File,
        written: u64,
    },
}

impl OutputSink {
    async fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        match self {
            OutputSink::Memory {
                buf,
                limit,
                truncated,
            } => {
                if buf.len() < *limit {
                    let room = *limit - buf.len();
                    if chunk.len() > room {
                        buf.extend_from_slice(&chunk[..room]);
                        *truncated = true;
                    } else {
                        buf.extend_from_slice(chunk);
                    }
                } else if !chunk.is_empty() {
                    *truncated = true;
                }
                Ok(())
            }
            OutputSink::File { file, written } => {
                file.write_all(chunk).await?;
                *written += chunk.len() as u64;
                Ok(())
            }
        }
    }

    async fn finish(self) -> std::io::Result<(Vec<u8>, bool)> {
        match self {
            OutputSink::Memory { buf, truncated, .. } => Ok((buf, truncated)),
            OutputSink::File { mut file, written } => {
                file.flush().await?;
                debug!(bytes = written, "output redirected to file");
                Ok((Vec::new(), false))
            }
        }
    }
}

/// Drains a child's combined output into the sink while racing process
/// exit against the deadline. Returns the exit code and the timeout flag.
async fn consume_output(
    mut child: Child,
    timeout: Duration,
    sink: &mut OutputSink,
) -> Result<(i32, bool)> {
    let stdout = child.stdout.take().ok_or_else(|| {
        RunnerError::Io(std::io::Error::other(
            "stdout pipe was unexpectedly not available",
        ))
    })?;
    let stderr = child.stderr.take().ok_or_else(|| {
        RunnerError::Io(std::io::Error::other(
            "stderr pipe was unexpectedly not available",
        ))
    })?;

    // Interleave reads from stdout and stderr to preserve write order as
    // much as possible.
    let mut stdout_reader = BufReader::new(stdout);
    let mut stderr_reader = BufReader::new(stderr);

    let mut tmp_stdout = [0u8; READ_CHUNK_SIZE];
    let mut tmp_stderr = [0u8; READ_CHUNK_SIZE];

    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut child_finished = false;
    let mut exit_status: Option<ExitStatus> = None;
    let mut timed_out = false;

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    // Drive both pipes, process exit, and the deadline concurrently. The
    // deadline branch breaks the loop outright: draining must not outlive
    // the timeout even when a grandchild inherits the pipes and keeps
    // them open past the child's own exit.
    while stdout_open || stderr_open || !child_finished {
        tokio::select! {
            _ = &mut deadline => {
                if !child_finished {
                    let _ = child.start_kill();
                    timed_out = true;
                }
                break;
            }

            res = child.wait(), if !child_finished => {
                exit_status = Some(res?);
                child_finished = true;
            }

            read = stdout_reader.read(&mut tmp_stdout), if stdout_open => {
                match read {
                    Ok(0) => stdout_open = false,
                    Ok(n) => sink.write(&tmp_stdout[..n]).await?,
                    Err(e) => return Err(RunnerError::Io(e)),
                }
            }

            read = stderr_reader.read(&mut tmp_stderr), if stderr_open => {
                match read {
                    Ok(0) => stderr_open = false,
                    Ok(n) => sink.write(&tmp_stderr[..n]).await?,
                    Err(e) => return Err(RunnerError::Io(e)),
                }
            }
        }
    }

    let exit_code = if timed_out {
        TIMEOUT_EXIT_CODE
    } else {
        exit_status.map_or(TIMEOUT_EXIT_CODE, exit_code_of)
    };

    Ok((exit_code, timed_out))
}

fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return EXIT_CODE_SIGNAL_BASE + signal;
        }
    }
    TIMEOUT_EXIT_CODE
}
