//! Configuration types and defaults for bazel-clippy.
//!
//! This module defines enums, constants, and default value functions
//! used by the Config struct.

use serde::{Deserialize, Serialize};

/// File name of the lock record inside the temp directory.
pub const DEFAULT_LOCK_FILE_NAME: &str = "bazel-clippy.pid";

/// How the resolved target is linted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LintMode {
    /// Build with the Clippy aspect (default).
    #[default]
    Clippy,
    /// Plain compile with JSON rustc diagnostics.
    Check,
}

impl LintMode {
    /// Name used in status lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            LintMode::Clippy => "clippy",
            LintMode::Check => "check",
        }
    }
}

/// Marker files identifying a Bazel project root.
pub fn default_marker_files() -> Vec<String> {
    vec![
        "WORKSPACE".to_string(),
        "WORKSPACE.bazel".to_string(),
        "MODULE.bazel".to_string(),
    ]
}

/// Clippy flags passed as `--@rules_rust//:clippy_flag=<flag>`.
pub fn default_clippy_flags() -> Vec<String> {
    vec!["-Wclippy::all".to_string()]
}

/// Bazel exit codes that trigger a one-shot rerun.
///
/// 36 is a local environmental issue, 37 an internal Bazel error.
pub fn default_rerun_exit_codes() -> Vec<i32> {
    vec![36, 37]
}

// Default value functions for serde
pub(crate) fn default_bazel() -> String {
    "bazel".to_string()
}
pub(crate) fn default_source_extension() -> String {
    "rs".to_string()
}
pub(crate) fn default_termination_grace_ms() -> u64 {
    5_000
}
pub(crate) fn default_poll_interval_ms() -> u64 {
    50
}
pub(crate) fn default_target_kind() -> String {
    "^rust_".to_string()
}
