//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a lint run.
///
/// Loaded from an optional YAML file; every field has a default, and unknown
/// fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Bazel settings
    // =========================================================================
    /// Bazel executable (name on PATH or absolute path).
    #[serde(default = "default_bazel")]
    pub bazel: String,

    /// Files whose presence marks the project root.
    #[serde(default = "default_marker_files")]
    pub marker_files: Vec<String>,

    /// Regex matched against the rule kind reported by `bazel query`.
    #[serde(default = "default_target_kind")]
    pub target_kind: String,

    // =========================================================================
    // Lint settings
    // =========================================================================
    /// Expected source file extension (no leading dot).
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Lint mode used when the CLI does not pick one.
    #[serde(default)]
    pub mode: LintMode,

    /// Flags forwarded to Clippy through rules_rust.
    #[serde(default = "default_clippy_flags")]
    pub clippy_flags: Vec<String>,

    /// Extra `bazel build` flags (shell-words parsed; no shell).
    #[serde(default)]
    pub extra_flags: String,

    /// Bazel exit codes after which the build is run once more.
    #[serde(default = "default_rerun_exit_codes")]
    pub rerun_exit_codes: Vec<i32>,

    // =========================================================================
    // Run lock settings
    // =========================================================================
    /// Lock record location (default: `<temp dir>/bazel-clippy.pid`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,

    /// How long to wait for a previous run to exit after each signal.
    #[serde(default = "default_termination_grace_ms")]
    pub termination_grace_ms: u64,

    /// Interval between liveness probes while waiting.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bazel: default_bazel(),
            marker_files: default_marker_files(),
            target_kind: default_target_kind(),
            source_extension: default_source_extension(),
            mode: LintMode::default(),
            clippy_flags: default_clippy_flags(),
            extra_flags: String::new(),
            rerun_exit_codes: default_rerun_exit_codes(),
            lock_file: None,
            termination_grace_ms: default_termination_grace_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
