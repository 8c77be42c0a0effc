//! External fragmentation metric and free space statistics

use crate::store::Snapshot;
use serde::{Deserialize, Serialize};

/// External fragmentation in `[0, 1]`
///
/// `1 - largest_free_block / total_free`. Zero when there is no free space
/// or all of it is one block; approaches 1 as free space splinters.
pub fn fragmentation(snapshot: &Snapshot) -> f64 {
    let total_free = snapshot.total_free();
    if snapshot.free_count() == 0 || total_free == 0 {
        return 0.0;
    }

    let largest = snapshot.largest_free_block();
    1.0 - (largest as f64 / total_free as f64)
}

/// Summary of how the address space is used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSpaceStats {
    pub total_memory: u64,
    pub total_free: u64,
    pub total_allocated: u64,
    pub largest_free_block: u64,
    pub free_segment_count: usize,
    pub allocated_count: usize,
    /// Allocated share of the address space, `[0, 1]`
    pub utilization: f64,
    pub fragmentation: f64,
}

impl FreeSpaceStats {
    pub fn collect(snapshot: &Snapshot) -> Self {
        let total_allocated = snapshot.total_allocated();
        FreeSpaceStats {
            total_memory: snapshot.total_memory(),
            total_free: snapshot.total_free(),
            total_allocated,
            largest_free_block: snapshot.largest_free_block(),
            free_segment_count: snapshot.free_count(),
            allocated_count: snapshot.allocated_count(),
            utilization: total_allocated as f64 / snapshot.total_memory() as f64,
            fragmentation: fragmentation(snapshot),
        }
    }
}

impl Snapshot {
    pub fn fragmentation(&self) -> f64 {
        fragmentation(self)
    }

    pub fn stats(&self) -> FreeSpaceStats {
        FreeSpaceStats::collect(self)
    }
}
