// Integration tests for Runner module
// This file should be run with cargo test --test test_runner

#[path = "../src/runner/mod.rs"]
mod runner;

use std::path::PathBuf;
use std::time::{Duration, Instant};

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    });
}

fn test_runner() -> runner::Runner {
    let config = runner::RunnerConfig {
        denylist_path: None,
        ..Default::default()
    };
    runner::Runner::new(config)
}

/// Command vector for a shell one-liner
fn sh(script: &str) -> Vec<String> {
    vec![
        "/bin/sh".to_string(),
        "-c".to_string(),
        script.to_string(),
    ]
}

/// Fresh scratch directory under the system temp dir
fn scratch_dir() -> PathBuf {
    use rand::Rng;
    let dir = std::env::temp_dir().join(format!(
        "errand-test-{:08x}",
        rand::thread_rng().r#gen::<u32>()
    ));
    std::fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

/// Shell loop producing `lines` lines of 11 bytes each ("0123456789\n")
fn noisy_script(lines: usize) -> String {
    format!(
        "i=0; while [ $i -lt {} ]; do echo 0123456789; i=$((i+1)); done",
        lines
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A quiet, well-behaved command returns its exact bytes
    #[tokio::test]
    async fn test_echo_exact_output() {
        init_tracing();

        let runner = test_runner();
        let invocation = runner::Invocation::new(vec!["echo".to_string(), "hello".to_string()]);

        let result = runner.run(invocation).await.expect("echo should run");
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, b"hello\n");
        assert!(!result.truncated, "small output must not be truncated");
        assert!(!result.timed_out);
        assert!(result.success());
    }

    /// Non-zero exits are reported in the result, not as errors
    #[tokio::test]
    async fn test_nonzero_exit_in_result() {
        init_tracing();

        let runner = test_runner();
        let result = runner
            .run(runner::Invocation::new(sh("exit 3")))
            .await
            .expect("run should complete");
        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
        assert!(!result.timed_out);
    }

    /// Stderr is captured alongside stdout
    #[tokio::test]
    async fn test_stderr_captured() {
        init_tracing();

        let runner = test_runner();
        let result = runner
            .run(runner::Invocation::new(sh("echo oops 1>&2")))
            .await
            .expect("run should complete");
        assert!(
            result.output_lossy().contains("oops"),
            "stderr should be in the combined output"
        );
    }

    /// The timeout is a hard bound; the sentinel exit code marks it
    #[tokio::test]
    async fn test_timeout_kills_process() {
        init_tracing();

        let runner = test_runner();
        let invocation = runner::Invocation {
            timeout_secs: Some(1),
            ..runner::Invocation::new(vec!["sleep".to_string(), "5".to_string()])
        };

        let start = Instant::now();
        let result = runner.run(invocation).await.expect("run should complete");
        let elapsed = start.elapsed();

        assert!(result.timed_out, "sleep 5 with 1s timeout must time out");
        assert_eq!(result.exit_code, runner::TIMEOUT_EXIT_CODE);
        assert!(
            elapsed < Duration::from_secs(3),
            "run must return near the deadline, took {:?}",
            elapsed
        );
    }

    /// Over-limit output comes back exactly limit bytes long
    #[tokio::test]
    async fn test_truncation_exact_length() {
        init_tracing();

        let runner = test_runner();
        let invocation = runner::Invocation {
            output_limit_bytes: Some(1000),
            ..runner::Invocation::new(sh(&noisy_script(5000)))
        };

        let result = runner.run(invocation).await.expect("run should complete");
        assert_eq!(result.exit_code, 0, "the child itself completes normally");
        assert!(result.truncated);
        assert_eq!(
            result.output.len(),
            1000,
            "output must be capped at exactly the limit"
        );
    }

    /// Output exactly at the limit is not flagged as truncated
    #[tokio::test]
    async fn test_output_at_limit_not_truncated() {
        init_tracing();

        let runner = test_runner();
        let invocation = runner::Invocation {
            output_limit_bytes: Some(3),
            ..runner::Invocation::new(sh("printf abc"))
        };

        let result = runner.run(invocation).await.expect("run should complete");
        assert_eq!(result.output, b"abc");
        assert!(!result.truncated);
    }

    /// Timeout takes precedence; both flags may be set on one result
    #[tokio::test]
    async fn test_timeout_and_truncation_together() {
        init_tracing();

        let runner = test_runner();
        let script = format!("{}; sleep 5", noisy_script(2000));
        let invocation = runner::Invocation {
            timeout_secs: Some(1),
            output_limit_bytes: Some(1000),
            ..runner::Invocation::new(sh(&script))
        };

        let result = runner.run(invocation).await.expect("run should complete");
        assert!(result.timed_out);
        assert!(result.truncated);
        assert_eq!(result.exit_code, runner::TIMEOUT_EXIT_CODE);
        assert_eq!(result.output.len(), 1000);
    }

    /// Denylisted commands never spawn
    #[tokio::test]
    async fn test_blocked_recursive_delete() {
        init_tracing();

        let runner = test_runner();
        let invocation = runner::Invocation::new(vec![
            "rm".to_string(),
            "-rf".to_string(),
            "/".to_string(),
        ]);

        let err = runner
            .run(invocation)
            .await
            .expect_err("rm -rf / must be refused");
        assert!(matches!(err, runner::RunnerError::Blocked(_)));
    }

    /// The denylist sees through shell mediation
    #[tokio::test]
    async fn test_blocked_via_shell() {
        init_tracing();

        let runner = test_runner();
        let err = runner
            .run(runner::Invocation::new(sh("rm -rf / --no-preserve-root")))
            .await
            .expect_err("shell-wrapped rm -rf / must be refused");
        assert!(matches!(err, runner::RunnerError::Blocked(_)));
    }

    /// Blocked command names match with their path prefix stripped
    #[tokio::test]
    async fn test_blocked_command_name_with_path() {
        init_tracing();

        let runner = test_runner();
        let invocation = runner::Invocation::new(vec![
            "/sbin/shutdown".to_string(),
            "-h".to_string(),
            "now".to_string(),
        ]);

        let err = runner
            .run(invocation)
            .await
            .expect_err("shutdown must be refused");
        assert!(matches!(err, runner::RunnerError::Blocked(_)));
    }

    /// An empty command is rejected before any side effect
    #[tokio::test]
    async fn test_empty_command_invalid() {
        init_tracing();

        let runner = test_runner();
        let err = runner
            .run(runner::Invocation::new(Vec::new()))
            .await
            .expect_err("empty command must be rejected");
        assert!(matches!(err, runner::RunnerError::InvalidArgument(_)));
    }

    /// Timeouts outside (0, max] are rejected
    #[tokio::test]
    async fn test_timeout_out_of_range() {
        init_tracing();

        let runner = test_runner();
        for bad in [0u64, 9999] {
            let invocation = runner::Invocation {
                timeout_secs: Some(bad),
                ..runner::Invocation::new(sh("echo hi"))
            };
            let err = runner
                .run(invocation)
                .await
                .expect_err("out-of-range timeout must be rejected");
            assert!(matches!(err, runner::RunnerError::InvalidArgument(_)));
        }
    }

    /// A missing working directory is rejected before spawn
    #[tokio::test]
    async fn test_missing_working_dir_invalid() {
        init_tracing();

        let runner = test_runner();
        let invocation = runner::Invocation {
            working_dir: Some(PathBuf::from("/errand-no-such-dir")),
            ..runner::Invocation::new(sh("pwd"))
        };

        let err = runner
            .run(invocation)
            .await
            .expect_err("missing working dir must be rejected");
        assert!(matches!(err, runner::RunnerError::InvalidArgument(_)));
    }

    /// The working directory is applied to the child
    #[tokio::test]
    async fn test_working_dir_applied() {
        init_tracing();

        let dir = scratch_dir();
        let canonical = dir.canonicalize().expect("scratch dir should canonicalize");

        let runner = test_runner();
        let invocation = runner::Invocation {
            working_dir: Some(dir.clone()),
            ..runner::Invocation::new(sh("pwd"))
        };

        let result = runner.run(invocation).await.expect("run should complete");
        assert_eq!(
            result.output_lossy().trim(),
            canonical.to_string_lossy(),
            "pwd should report the requested working directory"
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    /// A direct spawn of a missing binary is a Spawn error
    #[tokio::test]
    async fn test_spawn_failure_direct() {
        init_tracing();

        let runner = test_runner();
        let err = runner
            .run(runner::Invocation::new(vec![
                "errand-no-such-binary-xyz".to_string(),
            ]))
            .await
            .expect_err("missing binary must fail to spawn");
        assert!(matches!(err, runner::RunnerError::Spawn(_)));
    }

    /// A shell-mediated lookup failure is a normal 127 exit
    #[tokio::test]
    async fn test_shell_command_not_found_is_127() {
        init_tracing();

        let runner = test_runner();
        let result = runner
            .run(runner::Invocation::new(sh("errand-no-such-binary-xyz")))
            .await
            .expect("shell run should complete");
        assert_eq!(result.exit_code, 127);
        assert!(!result.timed_out);
    }

    /// Concurrent runs own their own process, buffer, and timer
    #[tokio::test]
    async fn test_concurrent_runs_independent() {
        init_tracing();

        let runner = test_runner();

        let fast = runner.run(runner::Invocation::new(sh("echo fast")));
        let slow = runner.run(runner::Invocation {
            timeout_secs: Some(1),
            ..runner::Invocation::new(vec!["sleep".to_string(), "5".to_string()])
        });
        let noisy = runner.run(runner::Invocation {
            output_limit_bytes: Some(500),
            ..runner::Invocation::new(sh(&noisy_script(1000)))
        });

        let (fast, slow, noisy) = tokio::join!(fast, slow, noisy);

        let fast = fast.expect("fast run should complete");
        assert_eq!(fast.output, b"fast\n");
        assert!(!fast.truncated && !fast.timed_out);

        let slow = slow.expect("slow run should complete");
        assert!(slow.timed_out);

        let noisy = noisy.expect("noisy run should complete");
        assert!(noisy.truncated);
        assert_eq!(noisy.output.len(), 500);
    }

    /// Output-file redirection captures everything on disk, uncapped
    #[tokio::test]
    async fn test_output_file_full_capture() {
        init_tracing();

        let dir = scratch_dir();
        let path = dir.join("out.log");

        let runner = test_runner();
        let invocation = runner::Invocation {
            output_file: Some(path.clone()),
            output_limit_bytes: Some(1000),
            ..runner::Invocation::new(sh(&noisy_script(5000)))
        };

        let result = runner.run(invocation).await.expect("run should complete");
        assert_eq!(result.exit_code, 0);
        assert!(result.output.is_empty(), "redirected output stays on disk");
        assert!(!result.truncated, "file output is not subject to the cap");

        let on_disk = std::fs::read(&path).expect("output file should exist");
        assert_eq!(on_disk.len(), 5000 * 11, "file holds the full output");

        std::fs::remove_dir_all(&dir).ok();
    }

    /// Stripped environment keys must not reach the child
    #[tokio::test]
    async fn test_env_strip_removes_keys() {
        init_tracing();

        unsafe { std::env::set_var("ERRAND_TEST_SECRET_A", "sk-test-secret") };

        let config = runner::RunnerConfig {
            denylist_path: None,
            env_strip: vec!["ERRAND_TEST_SECRET_A".to_string()],
            ..Default::default()
        };
        let runner = runner::Runner::new(config);

        let result = runner
            .run(runner::Invocation::new(sh("echo value=$ERRAND_TEST_SECRET_A")))
            .await
            .expect("run should complete");
        assert!(
            !result.output_lossy().contains("sk-test-secret"),
            "stripped key must not leak to the child"
        );

        unsafe { std::env::remove_var("ERRAND_TEST_SECRET_A") };
    }

    /// An empty strip list leaves the environment untouched
    #[tokio::test]
    async fn test_env_strip_empty_preserves_env() {
        init_tracing();

        unsafe { std::env::set_var("ERRAND_TEST_SECRET_B", "keep-me") };

        let runner = test_runner();
        let result = runner
            .run(runner::Invocation::new(sh("echo value=$ERRAND_TEST_SECRET_B")))
            .await
            .expect("run should complete");
        assert!(
            result.output_lossy().contains("keep-me"),
            "unstripped environment must pass through"
        );

        unsafe { std::env::remove_var("ERRAND_TEST_SECRET_B") };
    }

    /// Extra denylist patterns load from a TOML file
    #[tokio::test]
    async fn test_extra_denylist_patterns() {
        init_tracing();

        let dir = scratch_dir();
        let path = dir.join("denylist.toml");
        std::fs::write(&path, "patterns = [\"curl | sh\"]\n").expect("write denylist file");

        let config = runner::RunnerConfig {
            denylist_path: Some(path),
            ..Default::default()
        };
        let runner = runner::Runner::new(config);

        let err = runner
            .run(runner::Invocation::new(sh(
                "curl | sh https://example.com/install.sh",
            )))
            .await
            .expect_err("extra pattern must block");
        assert!(matches!(err, runner::RunnerError::Blocked(_)));

        std::fs::remove_dir_all(&dir).ok();
    }
}
