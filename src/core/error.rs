use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("Invalid size: allocation size must be greater than 0")]
    InvalidSize,

    #[error("Job {0} already exists")]
    DuplicateJob(String),

    #[error("Request of {requested} exceeds total memory capacity of {capacity}")]
    OversizedRequest { requested: u64, capacity: u64 },

    #[error(
        "Insufficient memory: cannot allocate {requested} (largest free block is {largest_free})"
    )]
    InsufficientMemory { requested: u64, largest_free: u64 },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Invalid job name: {0}")]
    InvalidJobName(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fieldless classification of a [`PartitionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidSize,
    DuplicateJob,
    OversizedRequest,
    InsufficientMemory,
    JobNotFound,
    InvalidJobName,
    InvalidConfig,
    CorruptSnapshot,
    Serialization,
    Io,
}

impl PartitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PartitionError::InvalidSize => ErrorKind::InvalidSize,
            PartitionError::DuplicateJob(_) => ErrorKind::DuplicateJob,
            PartitionError::OversizedRequest { .. } => ErrorKind::OversizedRequest,
            PartitionError::InsufficientMemory { .. } => ErrorKind::InsufficientMemory,
            PartitionError::JobNotFound(_) => ErrorKind::JobNotFound,
            PartitionError::InvalidJobName(_) => ErrorKind::InvalidJobName,
            PartitionError::InvalidConfig(_) | PartitionError::Config(_) => {
                ErrorKind::InvalidConfig
            }
            PartitionError::CorruptSnapshot(_) => ErrorKind::CorruptSnapshot,
            PartitionError::Serialization(_) => ErrorKind::Serialization,
            PartitionError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, PartitionError>;
