//! Applies a [`DeletionPlan`].
//!
//! Three modes, decided per run:
//!
//! - **dry run**: every artifact in the delete-set is reported, nothing is
//!   spawned or removed;
//! - **local directory**: the artifact is removed from `local_dir/<name>`;
//! - **delete command**: the configured prefix is run with the artifact name
//!   (or its full path, when a local directory is also set) appended.
//!
//! With both a directory and a command configured, the command runs first and
//! the file is then removed from the directory. Failures are isolated per
//! artifact, except a delete command whose executable does not exist, which
//! stops the run.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::command::{CommandRunner, render};
use crate::config::RetentionConfig;
use crate::error::{CommandError, DeleteFailure, RetentionError};
use crate::plan::DeletionPlan;
use crate::reporter::Reporter;
use crate::types::Artifact;

/// A delete command prefix, tokenised into an argument vector.
///
/// The target is appended without a shell. When the prefix ends in
/// whitespace, or is a bare program name, the target becomes its own
/// argument. Otherwise it is glued onto the last token, so a prefix such as
/// `rm /srv/backups/` yields `rm /srv/backups/<name>`.
///
/// # Example
///
/// ```
/// use retain_core::DeleteCommand;
///
/// let cmd = DeleteCommand::parse("rclone deletefile ").unwrap();
/// assert_eq!(cmd.program(), "rclone");
/// assert_eq!(cmd.args_for("b2:bucket/a.tar"), vec!["deletefile", "b2:bucket/a.tar"]);
///
/// let glued = DeleteCommand::parse("rm '/srv/my backups/'").unwrap();
/// assert_eq!(glued.args_for("a.tar"), vec!["/srv/my backups/a.tar"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCommand {
    program: String,
    args: Vec<String>,
    glue: bool,
}

impl DeleteCommand {
    /// Tokenise `prefix` with shell quoting rules.
    ///
    /// # Errors
    ///
    /// Returns [`RetentionError::InvalidDeleteCommand`] if the prefix has
    /// unbalanced quotes or is empty.
    pub fn parse(prefix: &str) -> Result<Self, RetentionError> {
        let invalid = |reason: &'static str| RetentionError::InvalidDeleteCommand {
            command: prefix.to_string(),
            reason,
        };

        let mut words = shlex::split(prefix)
            .ok_or_else(|| invalid("unbalanced quotes or trailing escape"))?
            .into_iter();
        let program = words.next().ok_or_else(|| invalid("no program given"))?;
        let args: Vec<String> = words.collect();
        let glue = !args.is_empty() && !prefix.ends_with(char::is_whitespace);

        Ok(Self {
            program,
            args,
            glue,
        })
    }

    /// Program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for deleting `target`.
    pub fn args_for(&self, target: &str) -> Vec<String> {
        let mut args = self.args.clone();
        match args.last_mut() {
            Some(last) if self.glue => last.push_str(target),
            _ => args.push(target.to_string()),
        }
        args
    }
}

/// What happened to one artifact in the delete-set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteStatus {
    /// Dry run, or no deletion method configured: reported only.
    Reported,
    /// Removed.
    Deleted,
    /// Removal failed; the rest of the batch was still processed.
    Failed {
        /// Why.
        failure: DeleteFailure,
    },
}

/// Per-artifact execution result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    /// The artifact.
    pub artifact: Artifact,
    /// What happened to it.
    #[serde(flatten)]
    pub status: DeleteStatus,
}

/// Carries out a [`DeletionPlan`] according to a [`RetentionConfig`].
pub struct DeletionExecutor<'a> {
    config: &'a RetentionConfig,
    commands: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
    delete_command: Option<DeleteCommand>,
}

impl std::fmt::Debug for DeletionExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeletionExecutor")
            .field("config", &self.config)
            .field("delete_command", &self.delete_command)
            .finish_non_exhaustive()
    }
}

impl<'a> DeletionExecutor<'a> {
    /// Prepare an executor.
    ///
    /// The delete command is tokenised here, and on a live run its program is
    /// resolved so a missing executable is caught before anything is removed.
    ///
    /// # Errors
    ///
    /// - [`RetentionError::InvalidDeleteCommand`] if the prefix cannot be
    ///   tokenised.
    /// - [`RetentionError::DeleteCommandNotFound`] if the program does not
    ///   exist (live runs only).
    pub fn new(
        config: &'a RetentionConfig,
        commands: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
    ) -> Result<Self, RetentionError> {
        let delete_command = config
            .delete_command()
            .map(DeleteCommand::parse)
            .transpose()?;

        if let Some(cmd) = &delete_command {
            if !config.dry_run() {
                let resolved = commands.resolve(cmd.program()).map_err(|_| {
                    RetentionError::DeleteCommandNotFound {
                        program: cmd.program().to_string(),
                    }
                })?;
                tracing::debug!(program = cmd.program(), path = %resolved.display(), "resolved delete command");
            }
        }

        Ok(Self {
            config,
            commands,
            reporter,
            delete_command,
        })
    }

    /// Apply `plan`, returning one outcome per artifact in its delete-set.
    ///
    /// Artifacts in the keep-set are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`RetentionError::DeleteCommandNotFound`] if the delete
    /// command's executable disappears mid-run. Outcomes for artifacts
    /// already processed have been reported at that point.
    pub fn execute(&self, plan: &DeletionPlan) -> Result<Vec<DeletionOutcome>, RetentionError> {
        let report_only = self.config.dry_run() || !self.config.has_deletion_method();
        if self.config.dry_run() {
            self.reporter
                .info("This is a dry run. Not removing any backups.");
        } else if report_only {
            self.reporter.warning(
                "No local directory or delete command configured. Not removing any backups.",
            );
        }

        let mut outcomes = Vec::with_capacity(plan.delete().len());
        for artifact in plan.delete() {
            if plan.is_kept(artifact) {
                continue;
            }

            let status = if report_only {
                self.reporter.would_delete(artifact);
                DeleteStatus::Reported
            } else {
                let status = self.delete(artifact)?;
                match &status {
                    DeleteStatus::Failed { failure } => {
                        self.reporter.delete_failed(artifact, failure);
                    }
                    _ => self.reporter.deleted(artifact),
                }
                status
            };

            outcomes.push(DeletionOutcome {
                artifact: artifact.clone(),
                status,
            });
        }
        Ok(outcomes)
    }

    fn delete(&self, artifact: &Artifact) -> Result<DeleteStatus, RetentionError> {
        let local_path = match self.config.local_dir() {
            Some(dir) => match local_path(dir, artifact) {
                Some(path) => Some(path),
                None => {
                    return Ok(DeleteStatus::Failed {
                        failure: DeleteFailure::UnsafeName {
                            name: artifact.name().to_string(),
                        },
                    });
                }
            },
            None => None,
        };

        let mut removed_by_command = false;
        if let Some(cmd) = &self.delete_command {
            let target = local_path
                .as_ref()
                .map_or_else(|| artifact.name().to_string(), |p| p.to_string_lossy().into_owned());
            let args = cmd.args_for(&target);
            tracing::debug!(command = %render(cmd.program(), &args), "running delete command");

            match self.commands.run(cmd.program(), &args) {
                Ok(output) if output.success() => removed_by_command = true,
                Ok(output) => {
                    return Ok(DeleteStatus::Failed {
                        failure: DeleteFailure::CommandFailed {
                            code: output.code,
                            stderr: output.stderr.trim().to_string(),
                        },
                    });
                }
                Err(CommandError::NotFound { program }) => {
                    return Err(RetentionError::DeleteCommandNotFound { program });
                }
                Err(CommandError::TimedOut { timeout, .. }) => {
                    return Ok(DeleteStatus::Failed {
                        failure: DeleteFailure::TimedOut {
                            millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        },
                    });
                }
                Err(err) => {
                    return Ok(DeleteStatus::Failed {
                        failure: DeleteFailure::CommandUnavailable {
                            reason: err.to_string(),
                        },
                    });
                }
            }
        }

        if let Some(path) = local_path {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                // The command already took it away.
                Err(err) if removed_by_command && err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Ok(DeleteStatus::Failed {
                        failure: DeleteFailure::Filesystem {
                            path,
                            reason: err.to_string(),
                        },
                    });
                }
            }
        }

        Ok(DeleteStatus::Deleted)
    }
}

/// Join `artifact` onto `dir`, refusing names that are not plain relative
/// paths (absolute, `..`, or empty).
fn local_path(dir: &Path, artifact: &Artifact) -> Option<PathBuf> {
    let name = Path::new(artifact.name());
    let plain = name.components().next().is_some()
        && name.components().all(|c| matches!(c, Component::Normal(_)));
    plain.then(|| dir.join(name))
}
