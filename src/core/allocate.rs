//! Allocation: carving a job's segment out of a chosen free segment

use crate::allocator::{Placement, PlacementPolicy};
use crate::error::{PartitionError, Result};
use crate::segment::{IdSource, Segment};
use crate::store::Snapshot;
use crate::validation::JobName;
use tracing::debug;

/// Successful allocation
#[derive(Debug, Clone)]
pub struct Allocation {
    pub snapshot: Snapshot,
    /// The newly allocated segment
    pub segment: Segment,
    /// Next-fit cursor after this allocation
    pub cursor: u64,
    pub message: String,
}

/// Allocate `size` units to `job` using `policy`
///
/// Preconditions are checked in order: size is positive, the job is not
/// already allocated, the request fits the total address space. The chosen
/// free segment is either consumed whole or shrunk from the front, keeping
/// its identity; the new allocated segment always gets a fresh one.
///
/// On error the input snapshot is untouched.
pub fn allocate(
    snapshot: &Snapshot,
    job: &JobName,
    size: u64,
    policy: PlacementPolicy,
    cursor: u64,
    ids: &mut impl IdSource,
) -> Result<Allocation> {
    if size == 0 {
        return Err(PartitionError::InvalidSize);
    }

    if snapshot.find_job(job.as_str()).is_some() {
        return Err(PartitionError::DuplicateJob(job.to_string()));
    }

    if size > snapshot.total_memory() {
        return Err(PartitionError::OversizedRequest {
            requested: size,
            capacity: snapshot.total_memory(),
        });
    }

    let extents = snapshot.free_extents();
    let target = policy
        .select(&extents, size, cursor)
        .map(|idx| extents[idx])
        .ok_or_else(|| PartitionError::InsufficientMemory {
            requested: size,
            largest_free: snapshot.largest_free_block(),
        })?;

    let mut free = snapshot.free_map().clone();
    let mut allocated = snapshot.allocated_map().clone();

    if let Some(mut remainder) = free.remove(&target.start) {
        if remainder.length > size {
            remainder.shrink_front(size);
            free.insert(remainder.start, remainder);
        }
    }

    let segment = Segment::allocated(ids.next_id(), target.start, size, job.clone());
    allocated.insert(segment.start, segment.clone());

    let cursor = segment.end();

    debug!(
        "{} placed job {} ({} units) at {}, cursor now {}",
        policy, job, size, segment.start, cursor
    );

    Ok(Allocation {
        snapshot: Snapshot::from_parts(snapshot.total_memory(), free, allocated),
        segment,
        cursor,
        message: format!("Allocated {} units to job {}", size, job),
    })
}
