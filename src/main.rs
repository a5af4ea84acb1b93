//! errand - run one external command with a bounded timeout and output ceiling
//!
//! Prints the command's combined output to stdout byte-for-byte and exits
//! with the child's exit code (124 on timeout, as timeout(1) does).

mod runner;
mod tool;

use clap::Parser;
use runner::{Invocation, Runner, RunnerConfig};
use std::io::Write;
use std::path::PathBuf;
use std::process;
use tool::ToolRegistry;
use tracing::{Level, error, warn};
use tracing_subscriber::fmt;

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "errand")]
#[command(about = "Run an external command with a bounded timeout and output ceiling")]
struct Args {
    /// Working directory for the command
    #[arg(short = 'C', long)]
    cwd: Option<PathBuf>,

    /// Timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Captured-output ceiling in bytes
    #[arg(long)]
    output_limit: Option<usize>,

    /// Write full output to this file instead of capturing in memory
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Environment variable to remove from the child environment (repeatable)
    #[arg(long = "env-strip")]
    env_strip: Vec<String>,

    /// Print the result as a JSON object instead of raw output
    #[arg(long)]
    json: bool,

    /// Print the tool definitions as JSON and exit
    #[arg(long)]
    tools: bool,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Command and arguments to execute
    #[arg(trailing_var_arg = true, required_unless_present = "tools")]
    command: Vec<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the command's output only
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = RunnerConfig::from_env();
    config.env_strip.extend(args.env_strip.iter().cloned());

    if args.tools {
        let registry = ToolRegistry::new(config);
        match serde_json::to_string_pretty(&registry.definitions()) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "Failed to serialize tool definitions");
                process::exit(1);
            }
        }
        return;
    }

    let runner = Runner::new(config);

    let invocation = Invocation {
        working_dir: args.cwd,
        timeout_secs: args.timeout,
        output_limit_bytes: args.output_limit,
        output_file: args.output_file,
        ..Invocation::new(args.command)
    };

    let result = match runner.run(invocation).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Run failed");
            process::exit(1);
        }
    };

    if args.json {
        let json = serde_json::json!({
            "exit_code": result.exit_code,
            "output": result.output_lossy(),
            "truncated": result.truncated,
            "timed_out": result.timed_out,
            "duration_ms": result.duration.as_millis() as u64,
        });
        println!("{json}");
    } else {
        let mut stdout = std::io::stdout();
        stdout.write_all(&result.output).ok();
        stdout.flush().ok();
        if result.truncated {
            warn!("output truncated");
        }
        if result.timed_out {
            warn!("command timed out");
        }
    }

    if result.timed_out {
        process::exit(124);
    }
    process::exit(if result.exit_code < 0 {
        1
    } else {
        result.exit_code
    });
}
