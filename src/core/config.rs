//! Simulation configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! total_memory = 100000
//! policy = "best-fit"
//! ```

use crate::allocator::PlacementPolicy;
use crate::error::{PartitionError, Result};
use crate::store::DEFAULT_TOTAL_MEMORY;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Size of the simulated address space
    pub total_memory: u64,

    /// Policy used when an allocation does not name one
    pub policy: PlacementPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            total_memory: DEFAULT_TOTAL_MEMORY,
            policy: PlacementPolicy::FirstFit,
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_memory == 0 {
            return Err(PartitionError::InvalidConfig(
                "total_memory must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
