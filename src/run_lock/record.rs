//! The persisted lock record: one PID in a file.

use crate::error::{LintError, Result};
use crate::fs::atomic_write;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The lock record file holding the PID of the active run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRecord {
    path: PathBuf,
}

impl LockRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The recorded PID, if the record exists and holds one.
    ///
    /// Content that does not parse as a PID is treated as no record.
    pub fn read(&self) -> Result<Option<u32>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(parse_pid(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LintError::LockError(format!(
                "failed to read lock record '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Atomically replace the record with `pid`.
    pub fn write(&self, pid: u32) -> Result<()> {
        atomic_write(&self.path, format!("{}\n", pid).as_bytes()).map_err(|e| {
            LintError::LockError(format!(
                "failed to write lock record '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Remove the record if it still holds `pid`.
    ///
    /// Returns whether the record was removed. A record owned by another run
    /// (or already gone) is left alone.
    pub fn remove_if_owned(&self, pid: u32) -> io::Result<bool> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };
        if parse_pid(&content) != Some(pid) {
            return Ok(false);
        }
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn parse_pid(content: &str) -> Option<u32> {
    content.trim().parse::<u32>().ok().filter(|&pid| pid != 0)
}
