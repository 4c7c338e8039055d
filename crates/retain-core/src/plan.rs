//! Keep/delete partition of a listing.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::{Artifact, Decision};

/// The partition of a listing into artifacts to keep and artifacts to delete.
///
/// Built once per run by [`DeletionPlan::new`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionPlan {
    keep: Vec<Artifact>,
    delete: Vec<Artifact>,
}

impl DeletionPlan {
    /// Compute `all - keep` by name.
    ///
    /// The delete-set preserves listing order and contains each name at most
    /// once. A name in the keep-set is never in the delete-set, however many
    /// times it appears in `all`.
    ///
    /// # Example
    ///
    /// ```
    /// use retain_core::{Artifact, DeletionPlan};
    ///
    /// let all: Vec<Artifact> = ["a", "b", "c", "b"].into_iter().map(Artifact::from).collect();
    /// let plan = DeletionPlan::new(&all, &[Artifact::from("b")]);
    /// assert_eq!(plan.delete(), &[Artifact::from("a"), Artifact::from("c")]);
    /// ```
    pub fn new(all: &[Artifact], keep: &[Artifact]) -> Self {
        let kept: HashSet<&str> = keep.iter().map(Artifact::name).collect();
        let mut seen = HashSet::new();

        let delete = all
            .iter()
            .filter(|a| !kept.contains(a.name()))
            .filter(|a| seen.insert(a.name()))
            .cloned()
            .collect();

        Self {
            keep: keep.to_vec(),
            delete,
        }
    }

    /// Artifacts that survive, newest first.
    pub fn keep(&self) -> &[Artifact] {
        &self.keep
    }

    /// Artifacts to report or remove, in listing order.
    pub fn delete(&self) -> &[Artifact] {
        &self.delete
    }

    /// Whether `artifact` is in the keep-set.
    pub fn is_kept(&self, artifact: &Artifact) -> bool {
        self.keep.iter().any(|k| k.name() == artifact.name())
    }

    /// Decision for `artifact`.
    pub fn decision(&self, artifact: &Artifact) -> Decision {
        if self.is_kept(artifact) {
            Decision::Keep
        } else {
            Decision::Delete
        }
    }
}
