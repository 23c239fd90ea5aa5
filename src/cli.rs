//! CLI argument parsing for bazel-clippy.
//!
//! Uses clap derive macros. The file argument is optional at the parser
//! level so that a missing file is reported by input validation with the
//! tool's own message and exit code.

use crate::config::LintMode;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Lint a single Rust source file with Clippy through Bazel.
///
/// Finds the Bazel project containing FILE, resolves the target that
/// compiles it, stops any lint run still in flight, and builds the target
/// with the Clippy aspect and JSON diagnostics.
#[derive(Parser, Debug)]
#[command(name = "bazel-clippy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source file to lint.
    pub file: Option<PathBuf>,

    /// Lint mode (overrides the config file).
    #[arg(long, value_enum)]
    pub mode: Option<LintMode>,

    /// YAML config file.
    #[arg(long, env = "BAZEL_CLIPPY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Lock record location.
    #[arg(long, env = "BAZEL_CLIPPY_LOCK_FILE")]
    pub lock_file: Option<PathBuf>,

    /// Bazel executable.
    #[arg(long, env = "BAZEL_CLIPPY_BAZEL")]
    pub bazel: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Extra flags passed to `bazel build`.
    #[arg(last = true)]
    pub bazel_flags: Vec<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_only() {
        let cli = Cli::try_parse_from(["bazel-clippy", "src/lib.rs"]).unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("src/lib.rs")));
        assert_eq!(cli.mode, None);
        assert_eq!(cli.verbose, 0);
        assert!(cli.bazel_flags.is_empty());
    }

    #[test]
    fn file_is_optional() {
        let cli = Cli::try_parse_from(["bazel-clippy"]).unwrap();
        assert!(cli.file.is_none());
    }

    #[test]
    fn parses_all_options() {
        let cli = Cli::try_parse_from([
            "bazel-clippy",
            "--mode",
            "check",
            "--config",
            "/etc/bazel-clippy.yaml",
            "--lock-file",
            "/tmp/x.pid",
            "--bazel",
            "bazelisk",
            "-vv",
            "src/main.rs",
            "--",
            "--config=ci",
            "--keep_going",
        ])
        .unwrap();

        assert_eq!(cli.mode, Some(LintMode::Check));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/bazel-clippy.yaml")));
        assert_eq!(cli.lock_file, Some(PathBuf::from("/tmp/x.pid")));
        assert_eq!(cli.bazel.as_deref(), Some("bazelisk"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.file, Some(PathBuf::from("src/main.rs")));
        assert_eq!(cli.bazel_flags, vec!["--config=ci", "--keep_going"]);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["bazel-clippy", "--mode", "fmt", "a.rs"]).is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
