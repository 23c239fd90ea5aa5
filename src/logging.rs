//! Diagnostic logging to stderr.
//!
//! Status lines for the user go to stdout; tracing output goes to stderr so
//! it never mixes with what the editor reads. `BAZEL_CLIPPY_LOG` takes an
//! `EnvFilter` directive and overrides the `-v` count.

use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "BAZEL_CLIPPY_LOG";

/// Filter directive for a `-v` count.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}
