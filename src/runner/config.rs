// Runner configuration
#![allow(dead_code)]

use std::path::PathBuf;
use tracing::warn;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Default wall-clock timeout in seconds
    pub default_timeout_secs: u64,
    /// Hard ceiling on any timeout, default or per-call
    pub max_timeout_secs: u64,
    /// Default captured-output ceiling in bytes
    pub output_limit_bytes: usize,
    /// Shell used for string-form commands
    pub shell: String,
    /// Environment variable names removed from the child environment
    pub env_strip: Vec<String>,
    /// Extra denylist patterns file (TOML), skipped when absent
    pub denylist_path: Option<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 60,
            max_timeout_secs: 1800,
            output_limit_bytes: 10000,
            shell: String::from("/bin/sh"),
            env_strip: Vec::new(),
            denylist_path: dirs::home_dir().map(|p| p.join(".errand").join("denylist.toml")),
        }
    }
}

/// Parse an environment variable, logging a warning if the value is present but invalid.
fn parse_env_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(v) => match v.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = name, value = %v, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

impl RunnerConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = RunnerConfig::default();

        config.default_timeout_secs =
            parse_env_var("ERRAND_DEFAULT_TIMEOUT_SECS", config.default_timeout_secs);
        config.max_timeout_secs = parse_env_var("ERRAND_MAX_TIMEOUT_SECS", config.max_timeout_secs);
        config.output_limit_bytes =
            parse_env_var("ERRAND_OUTPUT_LIMIT_BYTES", config.output_limit_bytes);
        config.shell = parse_env_var("ERRAND_SHELL", config.shell);

        if let Ok(list) = std::env::var("ERRAND_ENV_STRIP") {
            config.env_strip = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(path) = std::env::var("ERRAND_DENYLIST_PATH") {
            config.denylist_path = Some(PathBuf::from(path));
        }

        config
    }
}
