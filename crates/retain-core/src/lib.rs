//! Retention decision engine for date-stamped backups.
//!
//! Given the names of backup artifacts (as printed by any listing command,
//! local or remote), decides which ones are recent enough to keep and removes
//! the rest.
//!
//! # Pipeline
//!
//! ```text
//! listing -> extract dates -> validate floor -> plan -> execute
//! ```
//!
//! - [`extract`]: parses the `MM_DD_YYYY` date embedded in every name. Any
//!   failure aborts the whole batch.
//! - [`policy`]: checks the retention floor and ranks artifacts newest first.
//! - [`plan`]: splits the listing into a keep-set and a delete-set.
//! - [`executor`]: reports (dry run) or deletes each artifact in the delete-set.
//! - [`runner`]: drives the stages above.
//!
//! Process spawning and decision logging are injected through the
//! [`CommandRunner`] and [`Reporter`] traits so the engine can be exercised
//! without touching real processes.

pub mod command;
pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod plan;
pub mod policy;
pub mod reporter;
pub mod runner;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use config::{DEFAULT_COPIES_TO_KEEP, MIN_COPIES_TO_KEEP, RetentionConfig};
pub use error::{CommandError, DeleteFailure, RetentionError};
pub use executor::{DeleteCommand, DeleteStatus, DeletionExecutor, DeletionOutcome};
pub use plan::DeletionPlan;
pub use policy::Evaluation;
pub use reporter::{NullReporter, Reporter};
pub use runner::{ArtifactRecord, RetentionRunner, RunOutcome, RunReport, Stage};
pub use types::{Artifact, DatedArtifact, Decision};
