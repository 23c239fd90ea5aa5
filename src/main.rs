//! bazel-clippy: lint a single Rust source file with Clippy through Bazel.
//!
//! This is the entry point for the `bazel-clippy` CLI, meant to be wired to
//! an editor's check-on-save hook. It parses arguments, runs the lint, and
//! maps errors to exit codes.

mod bazel;
mod cli;
mod commands;
mod config;
mod error;
mod exit_codes;
mod fs;
mod lint;
mod logging;
mod run_lock;
mod signals;
mod validate;
mod workspace;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    match commands::run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // The editor reads stdout, so errors go there too.
            println!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
