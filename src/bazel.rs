//! Bazel command runner and target resolution.
//!
//! Wraps `bazel query` with captured stdout/stderr and maps a workspace
//! relative source path to the rule that compiles it. Builds are run by the
//! `lint` module with inherited stdio.

use crate::error::{LintError, Result};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::process::{Command, Output};
use tracing::{debug, warn};

/// Result of a successful bazel command execution.
#[derive(Debug, Clone)]
pub struct BazelOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl BazelOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Non-empty stdout lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().map(str::trim).filter(|l| !l.is_empty())
    }
}

/// A Bazel label such as `//src:lib` or `@@//src:lib.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The package part: everything before the last `:`.
    ///
    /// A label without a `:` names the target with the package's own name,
    /// so the whole label is the package.
    pub fn package(&self) -> &str {
        match self.0.rfind(':') {
            Some(idx) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a bazel invocation did not produce usable output.
#[derive(Debug)]
pub enum QueryFailure {
    /// The command ran and exited non-zero.
    Exited { code: i32, message: String },
    /// The command could not be spawned.
    Spawn(LintError),
}

/// Run `bazel query` in `cwd`.
pub fn run_query(
    bazel: &str,
    cwd: &Path,
    args: &[&str],
) -> std::result::Result<BazelOutput, QueryFailure> {
    debug!(bazel, cwd = %cwd.display(), ?args, "running bazel query");

    let output = Command::new(bazel)
        .current_dir(cwd)
        .arg("query")
        .args(args)
        .output()
        .map_err(|e| {
            QueryFailure::Spawn(LintError::BazelError(format!(
                "failed to execute {} query: {} (is bazel installed?)",
                bazel, e
            )))
        })?;

    let bazel_output = BazelOutput::from_output(&output);

    if output.status.success() {
        Ok(bazel_output)
    } else {
        let message = if bazel_output.stderr.is_empty() {
            bazel_output.stdout.clone()
        } else {
            bazel_output.stderr.clone()
        };
        Err(QueryFailure::Exited {
            code: output.status.code().unwrap_or(-1),
            message,
        })
    }
}

/// Map a workspace-relative source path to the rule that compiles it.
///
/// Two queries run in the project root: the path itself yields the source
/// file's label, then the rules in that package whose `srcs` mention the
/// label are listed with their kind. The first rule whose kind matches
/// `kind` is returned.
pub fn resolve_target(bazel: &str, root: &Path, relative_file: &str, kind: &Regex) -> Result<Label> {
    let no_target = || LintError::NoTarget(relative_file.to_string());

    let file_label = match run_query(bazel, root, &[relative_file]) {
        Ok(output) => output.lines().next().map(Label::new).ok_or_else(no_target)?,
        Err(QueryFailure::Spawn(err)) => return Err(err),
        Err(QueryFailure::Exited { code, message }) => {
            warn!(file = relative_file, code, %message, "bazel query for source file failed");
            return Err(no_target());
        }
    };
    debug!(label = %file_label, "resolved source file label");

    let expression = rules_with_source(&file_label);
    let output = match run_query(bazel, root, &["--output=label_kind", &expression]) {
        Ok(output) => output,
        Err(QueryFailure::Spawn(err)) => return Err(err),
        Err(QueryFailure::Exited { code, message }) => {
            warn!(%expression, code, %message, "bazel query for owning rule failed");
            return Err(no_target());
        }
    };

    let candidates = matching_rules(&output.stdout, kind);
    if candidates.len() > 1 {
        debug!(
            ?candidates,
            "several rules compile this file; using the first one"
        );
    }
    candidates.into_iter().next().ok_or_else(no_target)
}

/// Query expression selecting the rules in `file`'s package listing it in `srcs`.
///
/// `attr()` matches a regex against the list rendered as `[a, b]`, so the
/// label is escaped and must sit between list delimiters.
pub fn rules_with_source(file: &Label) -> String {
    format!(
        r"attr('srcs', '[\[ ]{}[,\]]', '{}:*')",
        regex::escape(file.as_str()),
        file.package()
    )
}

/// Labels from `--output=label_kind` lines whose rule kind matches `kind`.
///
/// Lines look like `rust_library rule //src:lib`; source-file lines and rules
/// of other kinds are skipped.
pub fn matching_rules(label_kind_output: &str, kind: &Regex) -> Vec<Label> {
    label_kind_output
        .lines()
        .filter_map(|line| {
            let (rule_kind, label) = line.trim().split_once(" rule ")?;
            kind.is_match(rule_kind).then(|| Label::new(label.trim()))
        })
        .collect()
}
