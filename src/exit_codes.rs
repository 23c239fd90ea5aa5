//! Exit code constants for the bazel-clippy CLI.
//!
//! - 0: Success
//! - 1: User error (missing/invalid file argument, bad config)
//! - 2: Resolution failure (no project root, no build target)
//! - 3: Bazel failure (cannot spawn bazel, lint run failed)
//! - 4: Lock failure (lock record could not be read or written)
//!
//! A run terminated by a signal exits with `128 + signal`.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: missing file argument, nonexistent file, wrong extension, bad config.
pub const USER_ERROR: i32 = 1;

/// Resolution failure: no project root or no build target for the file.
pub const RESOLUTION_FAILURE: i32 = 2;

/// Bazel failure: bazel could not be executed or the lint build failed.
pub const BAZEL_FAILURE: i32 = 3;

/// Lock failure: the run lock record could not be read or written.
pub const LOCK_FAILURE: i32 = 4;

/// Base added to a signal number when the run is terminated by that signal.
pub const SIGNAL_BASE: i32 = 128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            RESOLUTION_FAILURE,
            BAZEL_FAILURE,
            LOCK_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn failure_codes_fit_below_signal_range() {
        for code in [USER_ERROR, RESOLUTION_FAILURE, BAZEL_FAILURE, LOCK_FAILURE] {
            assert!(code > SUCCESS && code < SIGNAL_BASE);
        }
    }
}
