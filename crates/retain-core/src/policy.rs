//! Retention floor check and recency ranking.
//!
//! Artifacts are ranked by `(date desc, listing position asc)`. Ranking over
//! pairs instead of a date-keyed map means two backups taken on the same day
//! are both retained candidates; exactly `copies_to_keep` distinct artifacts
//! survive regardless of duplicate dates.

use std::collections::HashSet;

use crate::types::DatedArtifact;

/// Result of applying the policy to a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Enough artifacts exist; these are the ones to keep, newest first.
    Keep(Vec<DatedArtifact>),
    /// Fewer artifacts than the floor. Nothing may be deleted.
    Insufficient {
        /// Distinct artifacts found.
        found: usize,
        /// The retention floor.
        required: usize,
    },
}

/// Select the `copies_to_keep` most recent artifacts.
///
/// Artifacts are identified by name; a name listed twice counts once and
/// keeps its first position. The floor (`copies_to_keep >= 3`) is enforced by
/// [`RetentionConfig`](crate::RetentionConfig) before this is called; here
/// only the count is compared against it.
///
/// # Example
///
/// ```
/// use retain_core::extract::extract_dates;
/// use retain_core::policy::evaluate;
/// use retain_core::{Artifact, Evaluation, NullReporter};
///
/// let names: Vec<Artifact> = ["a_01_01_2020", "a_01_01_2021", "a_01_01_2022", "a_01_01_2023"]
///     .into_iter()
///     .map(Artifact::from)
///     .collect();
/// let dated = extract_dates(&names, &NullReporter).unwrap();
///
/// let Evaluation::Keep(keep) = evaluate(&dated, 3) else { panic!() };
/// assert_eq!(keep[0].artifact.name(), "a_01_01_2023");
/// assert_eq!(keep.len(), 3);
/// ```
pub fn evaluate(dated: &[DatedArtifact], copies_to_keep: usize) -> Evaluation {
    let mut seen = HashSet::new();
    let mut ranked: Vec<&DatedArtifact> = dated
        .iter()
        .filter(|d| seen.insert(d.artifact.name()))
        .collect();

    if ranked.len() < copies_to_keep {
        tracing::debug!(
            found = ranked.len(),
            required = copies_to_keep,
            "retention floor not met"
        );
        return Evaluation::Insufficient {
            found: ranked.len(),
            required: copies_to_keep,
        };
    }

    ranked.sort_by(|a, b| b.date.cmp(&a.date).then(a.position.cmp(&b.position)));

    Evaluation::Keep(
        ranked
            .into_iter()
            .take(copies_to_keep)
            .cloned()
            .collect(),
    )
}
