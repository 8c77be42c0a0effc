//! Placement strategies for choosing a free segment
//!
//! Four classical policies select among the free extents, all scanning in
//! ascending address order:
//! - First fit: first extent large enough
//! - Best fit: smallest leftover, lowest address on ties
//! - Worst fit: largest extent, lowest address on ties
//! - Next fit: first fit resumed circularly from the allocation cursor

pub mod fit;

pub use fit::{BestFit, FirstFit, NextFit, WorstFit};

use crate::error::PartitionError;
use crate::extent::Extent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placement trait
///
/// A pure selection over free extents sorted by ascending start address.
pub trait Placement {
    /// Index into `free` of the chosen extent, or `None` if no extent has
    /// `length >= size`
    ///
    /// `cursor` is the address just past the most recent allocation; only
    /// next fit reads it.
    fn select(&self, free: &[Extent], size: u64, cursor: u64) -> Option<usize>;
}

/// The selectable placement policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    #[default]
    FirstFit,
    BestFit,
    WorstFit,
    NextFit,
}

impl PlacementPolicy {
    pub const ALL: [PlacementPolicy; 4] = [
        PlacementPolicy::FirstFit,
        PlacementPolicy::BestFit,
        PlacementPolicy::WorstFit,
        PlacementPolicy::NextFit,
    ];

    pub fn strategy(&self) -> &'static dyn Placement {
        match self {
            PlacementPolicy::FirstFit => &FirstFit,
            PlacementPolicy::BestFit => &BestFit,
            PlacementPolicy::WorstFit => &WorstFit,
            PlacementPolicy::NextFit => &NextFit,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlacementPolicy::FirstFit => "First Fit",
            PlacementPolicy::BestFit => "Best Fit",
            PlacementPolicy::WorstFit => "Worst Fit",
            PlacementPolicy::NextFit => "Next Fit",
        }
    }
}

impl Placement for PlacementPolicy {
    fn select(&self, free: &[Extent], size: u64, cursor: u64) -> Option<usize> {
        self.strategy().select(free, size, cursor)
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlacementPolicy {
    type Err = PartitionError;

    /// Accepts `first-fit`, `first_fit`, `First Fit`, `firstfit` and so on
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "firstfit" => Ok(PlacementPolicy::FirstFit),
            "bestfit" => Ok(PlacementPolicy::BestFit),
            "worstfit" => Ok(PlacementPolicy::WorstFit),
            "nextfit" => Ok(PlacementPolicy::NextFit),
            _ => Err(PartitionError::InvalidConfig(format!(
                "unknown placement policy: {}",
                s
            ))),
        }
    }
}
