// Denylist - command patterns refused before spawn
#![allow(dead_code)]

use crate::runner::error::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Command names refused outright, matched per token with the
/// path prefix stripped (`/sbin/shutdown` counts as `shutdown`).
const BLOCKED_COMMANDS: &[&str] = &["shutdown", "reboot", "halt", "poweroff", "telinit"];

/// Substrings refused anywhere in the lowercased command line.
const BLOCKED_PATTERNS: &[&str] = &[
    "rm -rf /",
    "rm -fr /",
    "rm --recursive --force /",
    "mkfs",
    "of=/dev/sd",
    "of=/dev/nvme",
    "> /dev/sd",
    ":(){",
    "init 0",
    "init 6",
];

/// Extra patterns file format
#[derive(Debug, Default, Deserialize)]
struct DenylistFile {
    #[serde(default)]
    patterns: Vec<String>,
}

/// Returns the matching pattern if the command is denylisted.
///
/// Matching is conservative: a hit anywhere in the joined command line
/// blocks, including commands mediated through `sh -c`.
pub fn find_match(command: &[String], extra_patterns: &[String]) -> Option<String> {
    let joined = command.join(" ").to_lowercase();

    for token in joined.split_whitespace() {
        let name = token.rsplit('/').next().unwrap_or(token);
        if BLOCKED_COMMANDS.contains(&name) {
            return Some(name.to_string());
        }
    }

    for pattern in BLOCKED_PATTERNS {
        if joined.contains(pattern) {
            return Some((*pattern).to_string());
        }
    }

    for pattern in extra_patterns {
        if !pattern.is_empty() && joined.contains(&pattern.to_lowercase()) {
            return Some(pattern.clone());
        }
    }

    None
}

/// Load extra denylist patterns from a TOML file
pub fn load_extra_patterns(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        debug!(path = %path.display(), "denylist file not found, using built-in patterns only");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)?;
    let file: DenylistFile = toml::from_str(&content)?;

    debug!(path = %path.display(), pattern_count = file.patterns.len(), "loaded extra denylist patterns");
    Ok(file.patterns)
}
