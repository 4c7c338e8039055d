//! Error taxonomy for retention runs.
//!
//! [`RetentionError`] is fatal: it ends the run and maps to a non-zero exit
//! code. [`DeleteFailure`] is scoped to a single artifact and is recorded in
//! the run report while the batch continues. [`CommandError`] is what the
//! injected [`CommandRunner`](crate::CommandRunner) returns when a process
//! could not be run to completion.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Errors that abort a retention run.
#[derive(Error, Debug)]
pub enum RetentionError {
    /// The configured retention floor is below the enforced minimum.
    #[error("Must retain a minimum of {minimum} backups (requested {requested})")]
    RetentionFloor {
        /// Value that was asked for.
        requested: usize,
        /// Smallest value accepted.
        minimum: usize,
    },

    /// An artifact name has no `MM_DD_YYYY` substring.
    #[error("Missing properly formatted date in {name}")]
    MissingDate {
        /// Offending artifact name.
        name: String,
    },

    /// An artifact name has a date-shaped substring that is not a real date.
    #[error("Improperly formatted date `{date}` in {name}: {source}")]
    InvalidDate {
        /// Offending artifact name.
        name: String,
        /// The substring that looked like a date.
        date: String,
        /// Why chrono rejected it.
        #[source]
        source: chrono::ParseError,
    },

    /// The delete command's executable does not exist.
    #[error("Delete command `{program}` was not found")]
    DeleteCommandNotFound {
        /// Program named by the delete command.
        program: String,
    },

    /// The delete command prefix could not be tokenised.
    #[error("Invalid delete command `{command}`: {reason}")]
    InvalidDeleteCommand {
        /// The prefix as configured.
        command: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// Failure to run an external command to completion.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program does not exist or is not executable.
    #[error("{program}: command not found")]
    NotFound {
        /// Program that could not be located.
        program: String,
    },

    /// The command exceeded the configured timeout and was killed.
    #[error("`{command}` timed out after {timeout:?}")]
    TimedOut {
        /// Rendered command line.
        command: String,
        /// Limit that was exceeded.
        timeout: Duration,
    },

    /// Spawning or waiting on the process failed.
    #[error("Failed to run `{command}`: {source}")]
    Io {
        /// Rendered command line.
        command: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Why a single artifact could not be deleted. Never aborts the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeleteFailure {
    /// The delete command ran and exited unsuccessfully.
    #[error("delete command exited with {}", describe_exit(.code, .stderr))]
    CommandFailed {
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Trimmed standard error.
        stderr: String,
    },

    /// The delete command did not finish within the timeout.
    #[error("delete command timed out after {millis}ms")]
    TimedOut {
        /// Configured limit in milliseconds.
        millis: u64,
    },

    /// The delete command could not be spawned for a reason other than a
    /// missing executable.
    #[error("delete command could not run: {reason}")]
    CommandUnavailable {
        /// Rendered underlying error.
        reason: String,
    },

    /// Removing the file from the local filesystem failed.
    #[error("failed to remove {}: {reason}", .path.display())]
    Filesystem {
        /// Path that was being removed.
        path: PathBuf,
        /// Rendered I/O error.
        reason: String,
    },

    /// The name would escape the configured directory when joined onto it.
    #[error("refusing to delete `{name}`: not a plain file name")]
    UnsafeName {
        /// Offending artifact name.
        name: String,
    },
}

#[allow(clippy::ref_option)]
fn describe_exit(code: &Option<i32>, stderr: &str) -> String {
    let status = code.map_or_else(|| "signal".to_string(), |c| format!("status {c}"));
    if stderr.is_empty() {
        status
    } else {
        format!("{status}: {stderr}")
    }
}
