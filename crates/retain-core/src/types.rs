//! Value types shared by every stage of a retention run.

use chrono::NaiveDate;
use serde::Serialize;

/// A backup artifact, identified by the raw name the listing command printed.
///
/// Names are untrusted input: they are never handed to a shell and are
/// validated before being joined onto a local directory.
///
/// # Example
///
/// ```
/// use retain_core::Artifact;
///
/// let artifact = Artifact::new("db_03_22_2017.tar.gz");
/// assert_eq!(artifact.name(), "db_03_22_2017.tar.gz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Artifact(String);

impl Artifact {
    /// Wrap a raw artifact name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name exactly as reported by the listing.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Artifact {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Artifact {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Artifact {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An artifact together with the date parsed from its name.
///
/// `position` is the index of the artifact in the listing and is
/// the tie-breaker when two artifacts carry the same date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatedArtifact {
    /// The artifact itself.
    pub artifact: Artifact,
    /// Calendar date extracted from the name (no time of day).
    pub date: NaiveDate,
    /// Zero-based index in the listing.
    pub position: usize,
}

/// Whether an artifact survives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Among the newest copies; never touched.
    Keep,
    /// Older than the retained copies; reported or removed.
    Delete,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keep => f.write_str("keep"),
            Self::Delete => f.write_str("delete"),
        }
    }
}
