//! Deallocation and coalescing of free segments

use crate::error::{PartitionError, Result};
use crate::segment::{IdSource, Segment};
use crate::store::Snapshot;
use std::collections::BTreeMap;
use tracing::debug;

/// Successful deallocation
#[derive(Debug, Clone)]
pub struct Deallocation {
    pub snapshot: Snapshot,
    /// The allocated segment that was released
    pub released: Segment,
    pub message: String,
}

/// Release the segment owned by `job` and coalesce the free set
///
/// The released range becomes a free segment with a fresh identity, which is
/// then merged with any address-adjacent free neighbours.
pub fn deallocate(
    snapshot: &Snapshot,
    job: &str,
    ids: &mut impl IdSource,
) -> Result<Deallocation> {
    let released = snapshot
        .find_job(job)
        .cloned()
        .ok_or_else(|| PartitionError::JobNotFound(job.to_string()))?;

    let mut allocated = snapshot.allocated_map().clone();
    allocated.remove(&released.start);

    let mut free = snapshot.free_map().clone();
    free.insert(
        released.start,
        Segment::free(ids.next_id(), released.start, released.length),
    );
    let free = coalesce(free, ids);

    debug!(
        "Released job {} ({} units at {}), {} free segments",
        job,
        released.length,
        released.start,
        free.len()
    );

    let message = format!("Deallocated job {} (freed {} units)", job, released.length);

    Ok(Deallocation {
        snapshot: Snapshot::from_parts(snapshot.total_memory(), free, allocated),
        released,
        message,
    })
}

/// Merge every run of address-adjacent free segments into one
///
/// One left-to-right sweep suffices since the map is address-ordered. A
/// merged segment takes a fresh identity; segments without a neighbour keep
/// theirs.
pub(crate) fn coalesce(
    free: BTreeMap<u64, Segment>,
    ids: &mut impl IdSource,
) -> BTreeMap<u64, Segment> {
    let mut merged: BTreeMap<u64, Segment> = BTreeMap::new();
    let mut run: Option<(Segment, bool)> = None;

    for seg in free.into_values() {
        run = match run {
            Some((current, was_merged)) => match current.extent().coalesce(&seg.extent()) {
                Some(combined) => Some((
                    Segment::free(current.id, combined.start, combined.length),
                    true,
                )),
                None => {
                    flush(&mut merged, (current, was_merged), ids);
                    Some((seg, false))
                }
            },
            None => Some((seg, false)),
        };
    }

    if let Some(finished) = run {
        flush(&mut merged, finished, ids);
    }

    merged
}

fn flush(
    merged: &mut BTreeMap<u64, Segment>,
    (mut seg, was_merged): (Segment, bool),
    ids: &mut impl IdSource,
) {
    if was_merged {
        seg.id = ids.next_id();
    }
    merged.insert(seg.start, seg);
}
