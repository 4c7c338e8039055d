//! Per-run retention settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::RetentionError;

/// Smallest retention floor the engine accepts.
pub const MIN_COPIES_TO_KEEP: usize = 3;

/// Retention floor used when none is configured.
pub const DEFAULT_COPIES_TO_KEEP: usize = 4;

/// Immutable settings for one retention run.
///
/// The floor is validated on construction, so a `RetentionConfig` that exists
/// always satisfies `copies_to_keep >= MIN_COPIES_TO_KEEP`.
///
/// # Example
///
/// ```
/// use retain_core::RetentionConfig;
///
/// let config = RetentionConfig::new(5)
///     .unwrap()
///     .with_local_dir("/srv/backups")
///     .with_dry_run(true);
/// assert_eq!(config.copies_to_keep(), 5);
/// assert!(RetentionConfig::new(2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionConfig {
    copies_to_keep: usize,
    local_dir: Option<PathBuf>,
    delete_command: Option<String>,
    dry_run: bool,
    command_timeout: Option<Duration>,
}

impl RetentionConfig {
    /// Create a config that keeps `copies_to_keep` artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`RetentionError::RetentionFloor`] when `copies_to_keep` is
    /// below [`MIN_COPIES_TO_KEEP`].
    pub fn new(copies_to_keep: usize) -> Result<Self, RetentionError> {
        if copies_to_keep < MIN_COPIES_TO_KEEP {
            return Err(RetentionError::RetentionFloor {
                requested: copies_to_keep,
                minimum: MIN_COPIES_TO_KEEP,
            });
        }
        Ok(Self {
            copies_to_keep,
            local_dir: None,
            delete_command: None,
            dry_run: false,
            command_timeout: None,
        })
    }

    /// Directory the artifacts live in, for filesystem deletion.
    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = Some(dir.into());
        self
    }

    /// Command prefix the artifact name (or full path) is appended to.
    pub fn with_delete_command(mut self, command: impl Into<String>) -> Self {
        self.delete_command = Some(command.into());
        self
    }

    /// Report the delete-set instead of deleting it.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Upper bound on every external command the run spawns.
    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Number of most recent artifacts that survive the run.
    pub fn copies_to_keep(&self) -> usize {
        self.copies_to_keep
    }

    /// Local directory, if filesystem deletion is configured.
    pub fn local_dir(&self) -> Option<&Path> {
        self.local_dir.as_deref()
    }

    /// Delete command prefix, if command deletion is configured.
    pub fn delete_command(&self) -> Option<&str> {
        self.delete_command.as_deref()
    }

    /// Whether this is a dry run.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Timeout applied to each external command.
    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    /// True when a live run has some way to remove artifacts.
    pub fn has_deletion_method(&self) -> bool {
        self.local_dir.is_some() || self.delete_command.is_some()
    }
}
