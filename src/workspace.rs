//! Bazel project root resolution.
//!
//! Walks upward from the linted file to the nearest directory containing a
//! marker file and expresses the file relative to that root, in the `/`
//! separated form `bazel query` expects.

use crate::error::{LintError, Result};
use std::path::{Component, Path, PathBuf};

/// A linted file located inside a Bazel project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Absolute path to the project root (the directory holding the marker).
    pub root: PathBuf,

    /// The marker file that identified the root.
    pub marker: String,

    /// The file path relative to `root`, `/`-separated.
    pub relative_file: String,
}

impl Workspace {
    /// Locate the project containing `file`.
    pub fn locate(file: &Path, markers: &[String]) -> Result<Self> {
        let (root, marker) = find_project_root(file, markers)?;
        let relative_file = relative_path(file, &root)?;
        Ok(Self {
            root,
            marker,
            relative_file,
        })
    }
}

/// Find the nearest ancestor of `file` containing one of `markers`.
///
/// Markers are checked in order within each directory, so the first listed
/// marker wins when a directory holds several.
pub fn find_project_root(file: &Path, markers: &[String]) -> Result<(PathBuf, String)> {
    let start = if file.is_dir() {
        Some(file)
    } else {
        file.parent()
    };

    for dir in start.into_iter().flat_map(Path::ancestors) {
        for marker in markers {
            if dir.join(marker).is_file() {
                return Ok((dir.to_path_buf(), marker.clone()));
            }
        }
    }

    Err(LintError::NoProject {
        start: file.to_path_buf(),
        markers: markers.join(", "),
    })
}

/// `file` with the `root` prefix and separator removed.
pub fn relative_path(file: &Path, root: &Path) -> Result<String> {
    let relative = file.strip_prefix(root).map_err(|_| {
        LintError::UserError(format!(
            "'{}' is not inside project root '{}'",
            file.display(),
            root.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(LintError::UserError(format!(
                    "'{}' is not a plain path below the project root",
                    relative.display()
                )));
            }
        }
    }

    if parts.is_empty() {
        return Err(LintError::UserError(format!(
            "'{}' is the project root itself",
            file.display()
        )));
    }

    Ok(parts.join("/"))
}
