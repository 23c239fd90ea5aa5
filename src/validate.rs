//! Input validation for the file argument.
//!
//! Runs before anything else: no lock is touched and no external command is
//! spawned until the argument has passed these checks.

use crate::error::{LintError, Result};
use std::path::{Path, PathBuf};

/// Validate the file argument and return it as an absolute path.
///
/// Fails when no argument was given, the path is empty or does not exist,
/// the path is not a regular file, or its extension is not `extension`
/// (compared case-sensitively).
pub fn validate_input(file: Option<&Path>, extension: &str) -> Result<PathBuf> {
    let file = match file {
        Some(file) if !file.as_os_str().is_empty() => file,
        _ => return Err(LintError::MissingFile),
    };

    if !file.exists() {
        return Err(LintError::FileNotFound(file.to_path_buf()));
    }
    if !file.is_file() {
        return Err(LintError::NotAFile(file.to_path_buf()));
    }

    if file.extension().and_then(|e| e.to_str()) != Some(extension) {
        return Err(LintError::WrongExtension {
            path: file.to_path_buf(),
            expected: extension.to_string(),
        });
    }

    std::path::absolute(file).map_err(|e| {
        LintError::UserError(format!(
            "failed to resolve absolute path of '{}': {}",
            file.display(),
            e
        ))
    })
}
