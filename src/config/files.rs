//! Default log file discovery.

use glob::glob;
use std::path::{Path, PathBuf};

/// Rotated system logs, e.g. `/var/log/messages-20201001.xz`.
pub const ROTATED_LOG_GLOB: &str = "/var/log/messages-*";

/// The live, unrotated system log.
pub const DEFAULT_LOG_FILE: &str = "/var/log/messages";

/// Log files used when none are given on the command line: every rotated log
/// in sorted order, followed by the current log if it exists.
pub fn default_log_files() -> Vec<PathBuf> {
    discover(ROTATED_LOG_GLOB, Path::new(DEFAULT_LOG_FILE))
}

fn discover(rotated: &str, current: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = match glob(rotated) {
        Ok(entries) => entries.filter_map(Result::ok).collect(),
        Err(e) => {
            tracing::warn!("invalid log file pattern {}: {}", rotated, e);
            Vec::new()
        }
    };
    paths.sort();

    if current.exists() {
        paths.push(current.to_path_buf());
    }
    paths
}
