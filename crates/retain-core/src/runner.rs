//! Orchestration of a retention run.
//!
//! ```text
//! Listing -> Extracting -> Validating -> Planning -> Executing -> Done
//!    |            |             |
//!    |            +-> Err       +-> Insufficient (nothing deleted)
//!    +-> NoArtifacts / ListingFailed (nothing deleted)
//! ```
//!
//! Every stage consumes the previous stage's output, so the run is strictly
//! sequential. Terminal states other than `Err` exit cleanly.

use chrono::NaiveDate;
use serde::Serialize;

use crate::command::CommandRunner;
use crate::config::RetentionConfig;
use crate::error::RetentionError;
use crate::executor::{DeleteStatus, DeletionExecutor, DeletionOutcome};
use crate::extract::extract_dates;
use crate::plan::DeletionPlan;
use crate::policy::{self, Evaluation};
use crate::reporter::Reporter;
use crate::types::{Artifact, Decision};

/// Stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Running the listing command.
    Listing,
    /// Parsing dates out of names.
    Extracting,
    /// Checking the retention floor and ranking.
    Validating,
    /// Computing the keep/delete partition.
    Planning,
    /// Reporting or deleting the delete-set.
    Executing,
    /// Finished.
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Listing => "listing",
            Self::Extracting => "extracting",
            Self::Validating => "validating",
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a run ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The listing was empty.
    NoArtifacts,
    /// The listing command failed; nothing was examined.
    ListingFailed {
        /// Rendered cause.
        reason: String,
    },
    /// Fewer artifacts than the retention floor; nothing was deleted.
    Insufficient {
        /// Distinct artifacts found.
        found: usize,
        /// Retention floor.
        required: usize,
    },
    /// The plan was executed.
    Completed(RunReport),
}

impl RunOutcome {
    /// The report, if the run got as far as executing.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// One listed artifact with its date and fate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    /// The artifact.
    pub artifact: Artifact,
    /// Date parsed from its name.
    pub date: NaiveDate,
    /// Keep or delete.
    pub decision: Decision,
}

/// Everything a completed run decided and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Whether deletions were only reported.
    pub dry_run: bool,
    /// Every distinct artifact, in listing order.
    pub artifacts: Vec<ArtifactRecord>,
    /// The keep/delete partition.
    pub plan: DeletionPlan,
    /// Per-artifact results for the delete-set.
    pub outcomes: Vec<DeletionOutcome>,
}

impl RunReport {
    /// Artifacts kept, newest first.
    pub fn keep_set(&self) -> &[Artifact] {
        self.plan.keep()
    }

    /// Artifacts selected for deletion, in listing order.
    pub fn delete_set(&self) -> &[Artifact] {
        self.plan.delete()
    }

    /// Number of artifacts actually removed.
    pub fn deleted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == DeleteStatus::Deleted)
            .count()
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DeleteStatus::Failed { .. }))
    }
}

/// Drives one retention run against one backup target.
pub struct RetentionRunner<'a> {
    config: &'a RetentionConfig,
    commands: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
}

impl std::fmt::Debug for RetentionRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> RetentionRunner<'a> {
    /// Bind a runner to its configuration and injected capabilities.
    pub fn new(
        config: &'a RetentionConfig,
        commands: &'a dyn CommandRunner,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            config,
            commands,
            reporter,
        }
    }

    /// Run the listing command and apply the retention policy to its output.
    ///
    /// # Errors
    ///
    /// Any [`RetentionError`] is fatal and is returned before anything is
    /// deleted, except [`RetentionError::DeleteCommandNotFound`] raised in
    /// the middle of the delete-set.
    pub fn run(&self, list_command: &str) -> Result<RunOutcome, RetentionError> {
        enter(Stage::Listing);
        let artifacts = match self.list(list_command) {
            Ok(artifacts) => artifacts,
            Err(reason) => {
                self.reporter.listing_failed(&reason);
                return Ok(RunOutcome::ListingFailed { reason });
            }
        };
        if artifacts.is_empty() {
            self.reporter.no_artifacts();
            return Ok(RunOutcome::NoArtifacts);
        }
        self.reporter.found(artifacts.len());

        enter(Stage::Extracting);
        let dated = extract_dates(&artifacts, self.reporter)?;

        enter(Stage::Validating);
        let keep = match policy::evaluate(&dated, self.config.copies_to_keep()) {
            Evaluation::Keep(keep) => keep,
            Evaluation::Insufficient { found, required } => {
                self.reporter.insufficient(found, required);
                return Ok(RunOutcome::Insufficient { found, required });
            }
        };

        enter(Stage::Planning);
        let keep_set: Vec<Artifact> = keep.into_iter().map(|d| d.artifact).collect();
        self.reporter.kept(&keep_set);
        let plan = DeletionPlan::new(&artifacts, &keep_set);

        enter(Stage::Executing);
        let executor = DeletionExecutor::new(self.config, self.commands, self.reporter)?;
        let outcomes = executor.execute(&plan)?;

        let mut seen = std::collections::HashSet::new();
        let records = dated
            .into_iter()
            .filter(|d| seen.insert(d.artifact.name().to_string()))
            .map(|d| ArtifactRecord {
                decision: plan.decision(&d.artifact),
                artifact: d.artifact,
                date: d.date,
            })
            .collect();

        enter(Stage::Done);
        Ok(RunOutcome::Completed(RunReport {
            dry_run: self.config.dry_run(),
            artifacts: records,
            plan,
            outcomes,
        }))
    }

    fn list(&self, command: &str) -> Result<Vec<Artifact>, String> {
        self.reporter.listing(command);
        let output = self
            .commands
            .run_shell(command)
            .map_err(|err| err.to_string())?;

        if !output.success() {
            let status = output
                .code
                .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
            let stderr = output.stderr.trim();
            return Err(if stderr.is_empty() {
                format!("listing command exited with {status}")
            } else {
                format!("listing command exited with {status}: {stderr}")
            });
        }
        Ok(parse_listing(&output.stdout))
    }
}

/// Split listing output into artifact names: one per line, `\r` stripped,
/// blank lines skipped. Other whitespace is part of the name.
pub fn parse_listing(stdout: &str) -> Vec<Artifact> {
    stdout
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(Artifact::from)
        .collect()
}

fn enter(stage: Stage) {
    tracing::debug!(%stage, "entering stage");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Listing, RecordingReporter, ScriptedRunner};

    const FIVE_YEARS: [&str; 5] = [
        "a_01_01_2020",
        "a_01_01_2021",
        "a_01_01_2022",
        "a_01_01_2023",
        "a_01_01_2024",
    ];

    fn names(artifacts: &[Artifact]) -> Vec<&str> {
        artifacts.iter().map(Artifact::name).collect()
    }

    #[test]
    fn test_keeps_newest_and_deletes_oldest() {
        let config = RetentionConfig::new(4).unwrap().with_delete_command("rm ");
        let runner = ScriptedRunner::listing(&FIVE_YEARS);
        let reporter = RecordingReporter::default();

        let outcome = RetentionRunner::new(&config, &runner, &reporter)
            .run("ls /backups")
            .unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(
            names(report.keep_set()),
            vec!["a_01_01_2024", "a_01_01_2023", "a_01_01_2022", "a_01_01_2021"]
        );
        assert_eq!(names(report.delete_set()), vec!["a_01_01_2020"]);
        assert_eq!(report.deleted_count(), 1);
        assert_eq!(
            runner.calls(),
            vec![vec!["rm".to_string(), "a_01_01_2020".to_string()]]
        );
        assert_eq!(runner.shell_calls(), vec!["ls /backups".to_string()]);
        assert!(reporter.contains("found 5"));
        assert!(reporter.contains("deleted a_01_01_2020"));
    }

    #[test]
    fn test_insufficient_backups_delete_nothing() {
        let config = RetentionConfig::new(3).unwrap().with_delete_command("rm ");
        let runner = ScriptedRunner::listing(&["a_01_01_2020", "a_01_01_2021"]);
        let reporter = RecordingReporter::default();

        let outcome = RetentionRunner::new(&config, &runner, &reporter)
            .run("ls")
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Insufficient {
                found: 2,
                required: 3
            }
        );
        assert!(runner.calls().is_empty());
        assert!(reporter.contains("warning: insufficient 2/3"));
    }

    #[test]
    fn test_unparseable_name_aborts_before_deleting() {
        let config = RetentionConfig::new(3).unwrap().with_delete_command("rm ");
        let mut listing = FIVE_YEARS.to_vec();
        listing.push("backup test name.tar.gz");
        let runner = ScriptedRunner::listing(&listing);
        let reporter = RecordingReporter::default();

        let err = RetentionRunner::new(&config, &runner, &reporter)
            .run("ls")
            .unwrap_err();

        assert!(matches!(err, RetentionError::MissingDate { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_invalid_date_aborts_before_deleting() {
        let config = RetentionConfig::new(3).unwrap().with_delete_command("rm ");
        let runner = ScriptedRunner::listing(&[
            "some_backup_03_22_2023.zip",
            "some_backup_10_34_2023.tar",
            "some_backup_10_01_2025.tar",
            "some_backup_07_03_2010.zip",
        ]);

        let err = RetentionRunner::new(&config, &runner, &RecordingReporter::default())
            .run("ls")
            .unwrap_err();

        assert!(matches!(err, RetentionError::InvalidDate { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_empty_listing_is_no_artifacts() {
        let config = RetentionConfig::new(3).unwrap();
        let runner = ScriptedRunner::listing(&[]);
        let reporter = RecordingReporter::default();

        let outcome = RetentionRunner::new(&config, &runner, &reporter)
            .run("ls /tmp/empty_dir")
            .unwrap();

        assert_eq!(outcome, RunOutcome::NoArtifacts);
        assert!(reporter.contains("warning: no backups found"));
    }

    #[test]
    fn test_failing_listing_command_is_not_fatal() {
        let config = RetentionConfig::new(3).unwrap().with_delete_command("rm ");
        let runner = ScriptedRunner::default().with_listing(Listing::Exits(2));
        let reporter = RecordingReporter::default();

        let outcome = RetentionRunner::new(&config, &runner, &reporter)
            .run("ls /nonexistent")
            .unwrap();

        assert!(matches!(outcome, RunOutcome::ListingFailed { ref reason } if reason.contains("status 2")));
        assert!(runner.calls().is_empty());
        assert!(reporter.contains("warning: listing failed"));
    }

    #[test]
    fn test_listing_timeout_is_not_fatal() {
        let config = RetentionConfig::new(3).unwrap();
        let runner = ScriptedRunner::default().with_listing(Listing::Hangs);

        let outcome = RetentionRunner::new(&config, &runner, &RecordingReporter::default())
            .run("rclone lsf remote:")
            .unwrap();

        assert!(matches!(outcome, RunOutcome::ListingFailed { .. }));
    }

    #[test]
    fn test_dry_run_is_repeatable() {
        let config = RetentionConfig::new(3)
            .unwrap()
            .with_delete_command("rm ")
            .with_dry_run(true);
        let runner = ScriptedRunner::listing(&FIVE_YEARS);
        let reporter = RecordingReporter::default();
        let retention = RetentionRunner::new(&config, &runner, &reporter);

        let first = retention.run("ls").unwrap();
        let second = retention.run("ls").unwrap();

        assert_eq!(first, second);
        let report = first.report().unwrap();
        assert_eq!(names(report.delete_set()), vec!["a_01_01_2020", "a_01_01_2021"]);
        assert_eq!(report.deleted_count(), 0);
        assert!(report.dry_run);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_missing_delete_executable_is_fatal() {
        let config = RetentionConfig::new(3)
            .unwrap()
            .with_delete_command("retain-test-missing-binary deletefile ");
        let runner = ScriptedRunner::listing(&FIVE_YEARS).missing("retain-test-missing-binary");

        let err = RetentionRunner::new(&config, &runner, &RecordingReporter::default())
            .run("ls")
            .unwrap_err();

        assert!(matches!(err, RetentionError::DeleteCommandNotFound { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_per_artifact_failures_still_complete() {
        let config = RetentionConfig::new(3).unwrap().with_delete_command("rm ");
        let runner = ScriptedRunner::listing(&FIVE_YEARS).failing("a_01_01_2020");

        let outcome = RetentionRunner::new(&config, &runner, &RecordingReporter::default())
            .run("ls")
            .unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.deleted_count(), 1);
    }

    #[test]
    fn test_report_records_every_decision() {
        let config = RetentionConfig::new(3).unwrap().with_dry_run(true);
        let runner = ScriptedRunner::listing(&[
            "db_05_01_2024",
            "db_01_01_2024",
            "db_05_01_2024",
            "db_03_01_2024",
            "db_04_01_2024",
        ]);

        let outcome = RetentionRunner::new(&config, &runner, &RecordingReporter::default())
            .run("ls")
            .unwrap();
        let report = outcome.report().unwrap();

        let decisions: Vec<(&str, Decision)> = report
            .artifacts
            .iter()
            .map(|r| (r.artifact.name(), r.decision))
            .collect();
        assert_eq!(
            decisions,
            vec![
                ("db_05_01_2024", Decision::Keep),
                ("db_01_01_2024", Decision::Delete),
                ("db_03_01_2024", Decision::Keep),
                ("db_04_01_2024", Decision::Keep),
            ]
        );
    }

    #[test]
    fn test_parse_listing_skips_blank_lines() {
        let parsed = parse_listing("a_01_01_2020\r\n\n  \nb 01_01_2021.tar \n");
        assert_eq!(
            parsed,
            vec![Artifact::from("a_01_01_2020"), Artifact::from("b 01_01_2021.tar ")]
        );
    }
}
