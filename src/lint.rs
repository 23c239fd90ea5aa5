//! Lint build invocation.
//!
//! Builds the `bazel build` command line for a lint mode and runs it with
//! inherited stdio, so Bazel's JSON diagnostics reach the editor unchanged.

use crate::bazel::Label;
use crate::config::{Config, LintMode};
use crate::error::{LintError, Result};
use crate::exit_codes;
use crate::signals::ChildSlot;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Aspect that runs Clippy over Rust targets.
pub const CLIPPY_ASPECT: &str = "@rules_rust//rust:defs.bzl%rust_clippy_aspect";

/// Output group produced by the Clippy aspect.
pub const CLIPPY_OUTPUT_GROUP: &str = "clippy_checks";

/// Result of a successful lint run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintOutcome {
    /// Number of bazel invocations (1, or 2 after a rerun).
    pub attempts: u32,
}

/// Full `bazel build` argument list for linting `target` in `mode`.
///
/// `trailing` are extra flags from the command line, appended after the
/// configured `extra_flags`. The target is always last.
pub fn build_args(
    mode: LintMode,
    target: &Label,
    config: &Config,
    trailing: &[String],
) -> Result<Vec<String>> {
    let mut args = vec![
        "build".to_string(),
        "--color=no".to_string(),
        "--curses=no".to_string(),
    ];

    match mode {
        LintMode::Clippy => {
            args.push(format!("--aspects={}", CLIPPY_ASPECT));
            args.push(format!("--output_groups={}", CLIPPY_OUTPUT_GROUP));
            args.push("--@rules_rust//:clippy_error_format=json".to_string());
            args.extend(
                config
                    .clippy_flags
                    .iter()
                    .map(|flag| format!("--@rules_rust//:clippy_flag={}", flag)),
            );
        }
        LintMode::Check => {
            args.push("--@rules_rust//:error_format=json".to_string());
        }
    }

    args.extend(config.extra_flag_args()?);
    args.extend(trailing.iter().cloned());
    args.push(target.as_str().to_owned());
    Ok(args)
}

/// Whether a build exiting with `code` gets its one rerun.
pub fn should_rerun(code: i32, rerun_exit_codes: &[i32]) -> bool {
    code != exit_codes::SUCCESS && rerun_exit_codes.contains(&code)
}

/// Lint `target`, rerunning once if the first build exits with a listed code.
pub fn run_lint(
    config: &Config,
    root: &Path,
    mode: LintMode,
    target: &Label,
    trailing: &[String],
    child: &ChildSlot,
) -> Result<LintOutcome> {
    let args = build_args(mode, target, config, trailing)?;

    let mut attempts = 1;
    let mut code = run_build(&config.bazel, root, &args, child)?;
    if should_rerun(code, &config.rerun_exit_codes) {
        println!("bazel exited with code {}; rerunning once", code);
        attempts += 1;
        code = run_build(&config.bazel, root, &args, child)?;
    }

    if code == exit_codes::SUCCESS {
        info!(label = %target, attempts, "lint run finished");
        Ok(LintOutcome { attempts })
    } else {
        Err(LintError::BuildFailed {
            target: target.to_string(),
            code,
        })
    }
}

/// Run bazel once, publishing its PID in `child` while it runs.
///
/// Returns the exit code, or `128 + signal` if bazel was killed by a signal.
fn run_build(bazel: &str, root: &Path, args: &[String], child: &ChildSlot) -> Result<i32> {
    debug!(bazel, cwd = %root.display(), ?args, "running bazel build");

    let mut process = Command::new(bazel)
        .current_dir(root)
        .args(args)
        .spawn()
        .map_err(|e| {
            LintError::BazelError(format!(
                "failed to execute {} build: {} (is bazel installed?)",
                bazel, e
            ))
        })?;

    // A signal landing between spawn and here is not forwarded to bazel.
    child.set(process.id());
    let status = process.wait();
    child.clear();

    let status = status
        .map_err(|e| LintError::BazelError(format!("failed to wait for {}: {}", bazel, e)))?;

    Ok(status
        .code()
        .or_else(|| status.signal().map(|s| exit_codes::SIGNAL_BASE + s))
        .unwrap_or(-1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Label {
        Label::new("//src:lib")
    }

    #[test]
    fn clippy_args() {
        let args = build_args(LintMode::Clippy, &target(), &Config::default(), &[]).unwrap();

        assert_eq!(
            args,
            vec![
                "build",
                "--color=no",
                "--curses=no",
                "--aspects=@rules_rust//rust:defs.bzl%rust_clippy_aspect",
                "--output_groups=clippy_checks",
                "--@rules_rust//:clippy_error_format=json",
                "--@rules_rust//:clippy_flag=-Wclippy::all",
                "//src:lib",
            ]
        );
    }

    #[test]
    fn check_args() {
        let args = build_args(LintMode::Check, &target(), &Config::default(), &[]).unwrap();

        assert_eq!(
            args,
            vec![
                "build",
                "--color=no",
                "--curses=no",
                "--@rules_rust//:error_format=json",
                "//src:lib",
            ]
        );
    }

    #[test]
    fn extra_and_trailing_flags_precede_target() {
        let config = Config {
            clippy_flags: vec![],
            extra_flags: "--config=ci --jobs 4".to_string(),
            ..Default::default()
        };
        let trailing = vec!["--keep_going".to_string()];

        let args = build_args(LintMode::Clippy, &target(), &config, &trailing).unwrap();

        let tail: Vec<&str> = args.iter().rev().take(5).rev().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["--config=ci", "--jobs", "4", "--keep_going", "//src:lib"]
        );
        assert!(!args.iter().any(|a| a.contains("clippy_flag=")));
    }

    #[test]
    fn every_mode_lints_the_given_target() {
        for mode in [LintMode::Clippy, LintMode::Check] {
            let label = Label::new("//crates/a:a");
            let args = build_args(mode, &label, &Config::default(), &[]).unwrap();
            assert_eq!(args.last().map(String::as_str), Some("//crates/a:a"));
        }
    }

    #[test]
    fn rerun_policy() {
        let codes = [36, 37];
        assert!(should_rerun(37, &codes));
        assert!(should_rerun(36, &codes));
        assert!(!should_rerun(1, &codes));
        assert!(!should_rerun(0, &[0]));
        assert!(!should_rerun(37, &[]));
    }

    #[test]
    fn missing_bazel_binary_is_a_bazel_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config {
            bazel: "/nonexistent/bazel-clippy-test/bazel".to_string(),
            ..Default::default()
        };

        let err = run_lint(
            &config,
            temp.path(),
            LintMode::Clippy,
            &target(),
            &[],
            &ChildSlot::new(),
        )
        .unwrap_err();

        assert!(matches!(err, LintError::BazelError(_)));
    }
}
