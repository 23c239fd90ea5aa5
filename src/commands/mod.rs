//! Command implementation for bazel-clippy.
//!
//! `run` is the entry point used by `main`: it resolves configuration,
//! validates the file argument, installs signal cleanup, and hands over to
//! the lint command.

mod lint_file;


pub use lint_file::{LintReport, lint_file};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::run_lock::{LockRecord, RunLock, SystemProcesses};
use crate::signals::{self, ChildSlot};
use crate::validate::validate_input;
use tracing::{Level, debug, info};

/// Run one lint invocation described by `cli`.
pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    // Nothing below runs for an invalid file argument.
    let file = validate_input(cli.file.as_deref(), &config.source_extension)?;

    let lock = RunLock::from_config(&config);
    let child = ChildSlot::new();
    let _cleanup = signals::install(
        LockRecord::new(lock.path()),
        std::process::id(),
        child.clone(),
    )?;

    let report = lint_file(
        &file,
        &config,
        &lock,
        &SystemProcesses,
        &cli.bazel_flags,
        &child,
    )?;

    println!("{}", summary(&report));
    Ok(())
}

/// One-line completion message for a lint run.
fn summary(report: &LintReport) -> String {
    info!(
        preemption = %report.preemption,
        attempts = report.outcome.attempts,
        "lint finished"
    );
    match report.outcome.attempts {
        1 => format!(
            "Lint of {} ({}) finished",
            report.workspace.relative_file, report.target
        ),
        n => format!(
            "Lint of {} ({}) finished after {} attempts",
            report.workspace.relative_file, report.target, n
        ),
    }
}

/// Load the config file (if any) and apply command-line overrides.
///
/// Precedence: defaults < config file < environment < flags. Environment
/// values arrive through the same clap fields as the flags.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(bazel) = &cli.bazel {
        config.bazel = bazel.clone();
    }
    if let Some(lock_file) = &cli.lock_file {
        config.lock_file = Some(lock_file.clone());
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    config.validate()?;
    if tracing::enabled!(Level::DEBUG) {
        debug!("resolved config:\n{}", config.to_yaml()?);
    }
    Ok(config)
}
