//! Reporter trait for dependency injection
//!
//! Every decision a run makes goes through a [`Reporter`] handed to the
//! runner. The CLI implementation writes to the append-only log and the
//! console; tests record the calls; [`NullReporter`] drops them.

use chrono::NaiveDate;

use crate::error::DeleteFailure;
use crate::types::Artifact;

/// Sink for the decisions of a retention run.
pub trait Reporter: Send + Sync {
    /// The listing command is about to run.
    fn listing(&self, command: &str);

    /// The listing produced `count` artifacts.
    fn found(&self, count: usize);

    /// The listing command failed; the run stops without deleting.
    fn listing_failed(&self, reason: &str);

    /// The listing produced no artifacts.
    fn no_artifacts(&self);

    /// A date was parsed from an artifact name.
    fn date_extracted(&self, artifact: &Artifact, date: NaiveDate);

    /// Fewer artifacts than the retention floor; nothing will be deleted.
    fn insufficient(&self, found: usize, required: usize);

    /// The keep-set, newest first.
    fn kept(&self, keep: &[Artifact]);

    /// Dry run: `artifact` would be removed.
    fn would_delete(&self, artifact: &Artifact);

    /// `artifact` was removed.
    fn deleted(&self, artifact: &Artifact);

    /// Removing `artifact` failed; the batch continues.
    fn delete_failed(&self, artifact: &Artifact, failure: &DeleteFailure);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message. Fatal run errors end up here.
    fn error(&self, msg: &str);
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn listing(&self, _: &str) {}
    fn found(&self, _: usize) {}
    fn listing_failed(&self, _: &str) {}
    fn no_artifacts(&self) {}
    fn date_extracted(&self, _: &Artifact, _: NaiveDate) {}
    fn insufficient(&self, _: usize, _: usize) {}
    fn kept(&self, _: &[Artifact]) {}
    fn would_delete(&self, _: &Artifact) {}
    fn deleted(&self, _: &Artifact) {}
    fn delete_failed(&self, _: &Artifact, _: &DeleteFailure) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
