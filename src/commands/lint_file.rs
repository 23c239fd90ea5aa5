//! Lint one validated source file.
//!
//! # Steps
//!
//! 1. Acquire the run lock, stopping any lint run still in flight
//! 2. Locate the Bazel project root and the file's relative path
//! 3. Resolve the rule that compiles the file with `bazel query`
//! 4. Build that rule with the lint flags for the configured mode
//!
//! The lock guard lives for the whole function, so the record is removed on
//! success and on every error return.

use crate::bazel::{self, Label};
use crate::config::Config;
use crate::error::Result;
use crate::lint::{self, LintOutcome};
use crate::run_lock::{Preemption, ProcessTable, RunLock};
use crate::signals::ChildSlot;
use crate::workspace::Workspace;
use std::path::Path;
use tracing::{debug, warn};

/// What a successful lint run did.
#[derive(Debug, Clone)]
pub struct LintReport {
    pub workspace: Workspace,
    pub target: Label,
    pub preemption: Preemption,
    pub outcome: LintOutcome,
}

/// Lint `file` (absolute, already validated) under `lock`.
pub fn lint_file(
    file: &Path,
    config: &Config,
    lock: &RunLock,
    procs: &impl ProcessTable,
    trailing: &[String],
    child: &ChildSlot,
) -> Result<LintReport> {
    let guard = lock.acquire(procs)?;
    let preemption = guard.preemption();
    if preemption != Preemption::None {
        println!("{}", preemption);
    }

    let workspace = Workspace::locate(file, &config.marker_files)?;
    debug!(
        root = %workspace.root.display(),
        marker = %workspace.marker,
        file = %workspace.relative_file,
        "project located"
    );

    let target = bazel::resolve_target(
        &config.bazel,
        &workspace.root,
        &workspace.relative_file,
        &config.target_kind_regex()?,
    )?;

    println!(
        "Linting {} ({}) with {}",
        workspace.relative_file,
        target,
        config.mode.as_str()
    );

    let outcome = lint::run_lint(
        config,
        &workspace.root,
        config.mode,
        &target,
        trailing,
        child,
    )?;

    if let Err(e) = guard.release() {
        warn!(error = %e, "failed to remove lock record");
    }
    Ok(LintReport {
        workspace,
        target,
        preemption,
        outcome,
    })
}
