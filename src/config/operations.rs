//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::DEFAULT_LOCK_FILE_NAME;
use crate::error::{LintError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LintError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| LintError::UserError(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LintError::UserError(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `bazel` must be non-empty
    /// - `marker_files` must be non-empty plain file names
    /// - `source_extension` must be non-empty without a leading dot
    /// - `poll_interval_ms` must be positive
    /// - `target_kind` must be a valid regex
    /// - `extra_flags` must parse as shell words
    pub fn validate(&self) -> Result<()> {
        if self.bazel.trim().is_empty() {
            return Err(LintError::UserError(
                "config validation failed: bazel must not be empty".to_string(),
            ));
        }

        if self.marker_files.is_empty() {
            return Err(LintError::UserError(
                "config validation failed: marker_files must list at least one file name"
                    .to_string(),
            ));
        }
        for marker in &self.marker_files {
            if marker.is_empty() || marker.contains('/') {
                return Err(LintError::UserError(format!(
                    "config validation failed: marker_files entries must be plain file names (found '{}')",
                    marker
                )));
            }
        }

        if self.source_extension.is_empty() {
            return Err(LintError::UserError(
                "config validation failed: source_extension must not be empty".to_string(),
            ));
        }
        if self.source_extension.starts_with('.') {
            return Err(LintError::UserError(format!(
                "config validation failed: source_extension must not have a leading dot (found '{}'). Use '{}' instead.",
                self.source_extension,
                self.source_extension.trim_start_matches('.')
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(LintError::UserError(
                "config validation failed: poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        self.target_kind_regex()?;
        self.extra_flag_args()?;

        Ok(())
    }

    /// Lock record path, falling back to the temp directory.
    pub fn lock_path(&self) -> PathBuf {
        self.lock_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOCK_FILE_NAME))
    }

    pub fn termination_grace(&self) -> Duration {
        Duration::from_millis(self.termination_grace_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Compiled `target_kind` pattern.
    pub fn target_kind_regex(&self) -> Result<Regex> {
        Regex::new(&self.target_kind).map_err(|e| {
            LintError::UserError(format!(
                "config validation failed: target_kind is not a valid regex: {}",
                e
            ))
        })
    }

    /// `extra_flags` split into individual arguments.
    pub fn extra_flag_args(&self) -> Result<Vec<String>> {
        shell_words::split(&self.extra_flags).map_err(|e| {
            LintError::UserError(format!(
                "config validation failed: failed to parse extra_flags: {}\nFix: check for unmatched quotes or invalid escape sequences.",
                e
            ))
        })
    }
}
