//! Operations a driver can submit, as plain data

use crate::allocator::PlacementPolicy;
use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};

/// One request against the current snapshot
///
/// ```
/// use partition_sim::Operation;
///
/// let op: Operation = serde_json::from_str(r#"{"op":"allocate","job":"A","size":3000}"#).unwrap();
/// assert_eq!(op, Operation::allocate("A", 3000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Allocate {
        job: String,
        size: u64,
        /// Overrides the driver's configured policy
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy: Option<PlacementPolicy>,
    },
    Deallocate {
        job: String,
    },
    Compact,
}

impl Operation {
    pub fn allocate(job: impl Into<String>, size: u64) -> Self {
        Operation::Allocate {
            job: job.into(),
            size,
            policy: None,
        }
    }

    pub fn deallocate(job: impl Into<String>) -> Self {
        Operation::Deallocate { job: job.into() }
    }
}

/// What happened when an [`Operation`] was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub ok: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Next-fit cursor after the operation
    pub cursor: u64,
}
