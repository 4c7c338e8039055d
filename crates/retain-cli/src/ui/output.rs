//! Console and log reporter.
//!
//! Every decision the engine reports is written as a `tracing` event, which
//! lands in the append-only log file, and echoed to the terminal unless the
//! output is quiet.

use chrono::NaiveDate;
use crossterm::style::Stylize;
use retain_core::{Artifact, DeleteFailure, Reporter};

use super::theme::Theme;

/// [`Reporter`] used by the `retain` binary.
#[derive(Debug, Clone)]
pub struct Output {
    backup_name: String,
    quiet: bool,
    theme: Theme,
}

impl Output {
    /// Create a reporter for one backup target. `quiet` silences the console
    /// only; log events are always emitted.
    pub fn new(backup_name: impl Into<String>, quiet: bool) -> Self {
        Self {
            backup_name: backup_name.into(),
            quiet,
            theme: Theme::default(),
        }
    }

    fn say(&self, line: &str) {
        if !self.quiet {
            println!("  {line}");
        }
    }

    fn complain(&self, line: &str) {
        if !self.quiet {
            eprintln!("  {line}");
        }
    }
}

impl Reporter for Output {
    fn listing(&self, command: &str) {
        tracing::info!("Finding backups using command: {command}.");
    }

    fn found(&self, count: usize) {
        tracing::info!("Found {count} backups.");
        self.say(&format!(
            "{} Found {count} backups of {}",
            self.theme.icons.info,
            self.backup_name.as_str().with(self.theme.colors.artifact)
        ));
    }

    fn listing_failed(&self, reason: &str) {
        self.warning(&format!("Could not list backups: {reason}"));
    }

    fn no_artifacts(&self) {
        self.warning("No backups found");
    }

    fn date_extracted(&self, artifact: &Artifact, date: NaiveDate) {
        tracing::debug!(%artifact, %date, "identified backup date");
    }

    fn insufficient(&self, found: usize, required: usize) {
        tracing::info!(
            "Number of backups isn't above the minimum retention level of {required}."
        );
        self.warning(&format!(
            "Insufficient backups are being maintained ({found} found, {required} required)"
        ));
    }

    fn kept(&self, keep: &[Artifact]) {
        let names: Vec<&str> = keep.iter().map(Artifact::name).collect();
        tracing::info!("Backups to keep: {}", names.join(", "));
    }

    fn would_delete(&self, artifact: &Artifact) {
        tracing::info!("Backup to be removed: {artifact}");
        self.say(&format!(
            "{} Backup to be removed: {}",
            self.theme.icons.pending,
            artifact.name().with(self.theme.colors.delete)
        ));
    }

    fn deleted(&self, artifact: &Artifact) {
        tracing::info!("Successfully removed backup: {artifact}");
        self.say(&format!(
            "{} Removed {}",
            self.theme.icons.success.with(self.theme.colors.success),
            artifact.name().with(self.theme.colors.artifact)
        ));
    }

    fn delete_failed(&self, artifact: &Artifact, failure: &DeleteFailure) {
        tracing::error!(
            "{}: an error occurred when attempting to delete {artifact}: {failure}",
            self.backup_name
        );
        self.complain(&format!(
            "{} Failed to remove {}: {failure}",
            self.theme.icons.error.with(self.theme.colors.error),
            artifact.name().with(self.theme.colors.artifact),
        ));
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
        self.say(&format!("{} {msg}", self.theme.icons.info));
    }

    fn warning(&self, msg: &str) {
        tracing::warn!("{msg}");
        self.complain(&format!(
            "{} {}",
            self.theme.icons.warning.with(self.theme.colors.warning),
            msg.with(self.theme.colors.warning)
        ));
    }

    /// Errors reach stderr even when the output is quiet.
    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
        eprintln!(
            "  {} {}",
            self.theme.icons.error.with(self.theme.colors.error),
            msg.with(self.theme.colors.error)
        );
    }
}
