//! Date extraction from artifact names.
//!
//! Every artifact name must embed its creation date as `MM_DD_YYYY`. The first
//! substring with that digit shape is parsed; later ones are ignored. A name
//! without one, or with one that is not a real calendar date, fails the whole
//! batch: an artifact whose age is unknown could otherwise be deleted by
//! mistake.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::RetentionError;
use crate::reporter::Reporter;
use crate::types::{Artifact, DatedArtifact};

/// chrono format of the embedded date.
pub const DATE_FORMAT: &str = "%m_%d_%Y";

// ASCII digits only; `\d` would also match other Unicode decimal digits.
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{2}_[0-9]{2}_[0-9]{4}").expect("date pattern is valid"));

/// Parse the date embedded in `name`.
///
/// # Errors
///
/// - [`RetentionError::MissingDate`] if no `NN_NN_NNNN` substring exists.
/// - [`RetentionError::InvalidDate`] if the first such substring is not a
///   valid month/day/year date.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use retain_core::extract::extract_date;
///
/// let date = extract_date("site_10_01_2022.tar").unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2022, 10, 1).unwrap());
/// assert!(extract_date("site_10_34_2022.tar").is_err());
/// ```
pub fn extract_date(name: &str) -> Result<NaiveDate, RetentionError> {
    let found = DATE_PATTERN
        .find(name)
        .ok_or_else(|| RetentionError::MissingDate {
            name: name.to_string(),
        })?;

    NaiveDate::parse_from_str(found.as_str(), DATE_FORMAT).map_err(|source| {
        RetentionError::InvalidDate {
            name: name.to_string(),
            date: found.as_str().to_string(),
            source,
        }
    })
}

/// Parse the date of every artifact, in listing order.
///
/// Stops at the first failure; nothing after it is examined.
///
/// # Errors
///
/// Propagates the first [`extract_date`] failure.
pub fn extract_dates(
    artifacts: &[Artifact],
    reporter: &dyn Reporter,
) -> Result<Vec<DatedArtifact>, RetentionError> {
    reporter.info("Identifying date of each backup using filename.");

    let dated = artifacts
        .iter()
        .enumerate()
        .map(|(position, artifact)| {
            let date = extract_date(artifact.name())?;
            reporter.date_extracted(artifact, date);
            Ok(DatedArtifact {
                artifact: artifact.clone(),
                date,
                position,
            })
        })
        .collect::<Result<Vec<_>, RetentionError>>()?;

    reporter.info(&format!(
        "Identified {} dates / {} backups",
        dated.len(),
        artifacts.len()
    ));
    Ok(dated)
}
