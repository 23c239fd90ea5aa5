//! Error types for the bazel-clippy CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bazel-clippy operations.
///
/// Every variant terminates the run; there is no partial success.
#[derive(Error, Debug)]
pub enum LintError {
    /// No file argument was given.
    #[error("no file given. Usage: bazel-clippy <FILE>")]
    MissingFile,

    /// The file argument does not name an existing path.
    #[error("file '{}' does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The file argument exists but is not a regular file.
    #[error("'{}' is not a source file", .0.display())]
    NotAFile(PathBuf),

    /// The file argument does not have the expected source extension.
    #[error("file '{}' is not a .{expected} file", .path.display())]
    WrongExtension { path: PathBuf, expected: String },

    /// No marker file was found in any ancestor of the file.
    #[error("no project detected: none of [{markers}] found above '{}'", .start.display())]
    NoProject { start: PathBuf, markers: String },

    /// Bazel could not map the file to a build target.
    #[error("could not find a build target for '{0}'")]
    NoTarget(String),

    /// Invalid configuration or other user-correctable state.
    #[error("{0}")]
    UserError(String),

    /// Bazel could not be executed.
    #[error("Bazel invocation failed: {0}")]
    BazelError(String),

    /// The lint build ran and exited non-zero.
    #[error("lint of {target} failed (bazel exit code {code})")]
    BuildFailed { target: String, code: i32 },

    /// The run lock record could not be read or written.
    #[error("Lock operation failed: {0}")]
    LockError(String),
}

impl LintError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LintError::MissingFile
            | LintError::FileNotFound(_)
            | LintError::NotAFile(_)
            | LintError::WrongExtension { .. }
            | LintError::UserError(_) => exit_codes::USER_ERROR,
            LintError::NoProject { .. } | LintError::NoTarget(_) => {
                exit_codes::RESOLUTION_FAILURE
            }
            LintError::BazelError(_) | LintError::BuildFailed { .. } => exit_codes::BAZEL_FAILURE,
            LintError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for bazel-clippy operations.
pub type Result<T> = std::result::Result<T, LintError>;
