//! Validation for job names
//!
//! Every allocated segment is labeled with a job name that is unique across the
//! snapshot. Names arrive already parsed from the driver; this module only
//! guarantees they are usable as identifiers.

use crate::error::{PartitionError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A validated job name
///
/// # Rules
/// - Non-empty and not whitespace-only
/// - No leading or trailing whitespace
/// - No control characters
/// - At most 64 characters
///
/// Names are never normalized: `"B"` and `"B "` would be different jobs, so
/// the padded form is rejected rather than silently matched.
///
/// # Examples
///
/// ```
/// use partition_sim::JobName;
///
/// let job = JobName::new("J1").unwrap();
/// assert_eq!(job.as_str(), "J1");
///
/// assert!(JobName::new("").is_err());
/// assert!(JobName::new("   ").is_err());
/// assert!(JobName::new("J1 ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobName(String);

impl JobName {
    /// Maximum length in characters
    pub const MAX_LENGTH: usize = 64;

    /// Create a new validated job name
    ///
    /// # Errors
    ///
    /// Returns `InvalidJobName` if the name doesn't meet validation rules.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(JobName(name))
    }

    fn validate(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(PartitionError::InvalidJobName(
                "job name cannot be empty".to_string(),
            ));
        }

        if name.trim() != name {
            return Err(PartitionError::InvalidJobName(format!(
                "job name '{}' has surrounding whitespace",
                name.escape_debug()
            )));
        }

        if name.chars().count() > Self::MAX_LENGTH {
            return Err(PartitionError::InvalidJobName(format!(
                "job name too long (max {} characters)",
                Self::MAX_LENGTH
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(PartitionError::InvalidJobName(format!(
                "job name '{}' contains control characters",
                name.escape_debug()
            )));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for JobName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JobName {
    type Error = PartitionError;

    fn try_from(value: String) -> Result<Self> {
        JobName::new(value)
    }
}

impl TryFrom<&str> for JobName {
    type Error = PartitionError;

    fn try_from(value: &str) -> Result<Self> {
        JobName::new(value)
    }
}

impl From<JobName> for String {
    fn from(name: JobName) -> Self {
        name.0
    }
}
