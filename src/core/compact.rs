//! Compaction: sliding every allocation down to remove the gaps between them

use crate::segment::{IdSource, Segment};
use crate::store::Snapshot;
use std::collections::BTreeMap;
use tracing::info;

/// Result of a compaction (always succeeds)
#[derive(Debug, Clone)]
pub struct Compaction {
    pub snapshot: Snapshot,
    /// Allocated segments whose start address changed
    pub jobs_moved: usize,
    /// Next-fit cursor: the address just past the last allocation
    pub cursor: u64,
    pub message: String,
}

/// Pack allocations at the low end of the address space
///
/// Jobs keep their relative order and their identities; only their start
/// addresses change. All free segments are replaced by one trailing free
/// segment, omitted when memory is full. An already-compacted snapshot comes
/// back unchanged, trailing identity included.
pub fn compact(snapshot: &Snapshot, ids: &mut impl IdSource) -> Compaction {
    let mut allocated = BTreeMap::new();
    let mut next = 0u64;
    let mut jobs_moved = 0;

    for seg in snapshot.allocated_segments() {
        let mut slid = seg.clone();
        if slid.start != next {
            slid.slide_to(next);
            jobs_moved += 1;
        }
        next = slid.end();
        allocated.insert(slid.start, slid);
    }

    let used = next;
    let remaining = snapshot.total_memory() - used;

    let mut free = BTreeMap::new();
    if remaining > 0 {
        let trailing = match snapshot.free_map().get(&used) {
            Some(existing) if snapshot.free_count() == 1 && existing.length == remaining => {
                existing.clone()
            }
            _ => Segment::free(ids.next_id(), used, remaining),
        };
        free.insert(used, trailing);
    }

    info!(
        "Compacted {} jobs ({} moved), {} units free at {}",
        allocated.len(),
        jobs_moved,
        remaining,
        used
    );

    Compaction {
        snapshot: Snapshot::from_parts(snapshot.total_memory(), free, allocated),
        jobs_moved,
        cursor: used,
        message: format!("Compaction complete: moved {} jobs", jobs_moved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate::allocate;
    use crate::allocator::PlacementPolicy;
    use crate::deallocate::deallocate;
    use crate::extent::Extent;
    use crate::segment::SequentialIds;
    use crate::validation::JobName;

    fn scattered(ids: &mut SequentialIds) -> Snapshot {
        let mut snap = Snapshot::initialize(1000, ids).unwrap();
        for name in ["A", "B", "C", "D"] {
            let job = JobName::new(name).unwrap();
            snap = allocate(&snap, &job, 100, PlacementPolicy::FirstFit, 0, ids)
                .unwrap()
                .snapshot;
        }
        let snap = deallocate(&snap, "A", ids).unwrap().snapshot;
        deallocate(&snap, "C", ids).unwrap().snapshot
    }

    #[test]
    fn test_compact_slides_in_order() {
        let mut ids = SequentialIds::new();
        let snap = scattered(&mut ids);
        let b_id = snap.find_job("B").unwrap().id;
        let d_id = snap.find_job("D").unwrap().id;

        let out = compact(&snap, &mut ids);

        assert_eq!(out.jobs_moved, 2);
        assert_eq!(out.cursor, 200);
        let jobs: Vec<(String, u64)> = out
            .snapshot
            .allocated_segments()
            .map(|s| (s.job().unwrap().to_string(), s.start))
            .collect();
        assert_eq!(jobs, vec![("B".to_string(), 0), ("D".to_string(), 100)]);
        assert_eq!(out.snapshot.find_job("B").unwrap().id, b_id);
        assert_eq!(out.snapshot.find_job("D").unwrap().id, d_id);
        assert_eq!(out.snapshot.free_extents(), vec![Extent::new(200, 800)]);
        assert!(out.snapshot.is_compacted());
        out.snapshot.verify_partition().unwrap();
    }

    #[test]
    fn test_compact_idempotent() {
        let mut ids = SequentialIds::new();
        let snap = scattered(&mut ids);

        let once = compact(&snap, &mut ids);
        let twice = compact(&once.snapshot, &mut ids);

        assert_eq!(once.snapshot, twice.snapshot);
        assert_eq!(twice.jobs_moved, 0);
        assert_eq!(twice.cursor, once.cursor);
    }

    #[test]
    fn test_compact_empty_and_full() {
        let mut ids = SequentialIds::new();
        let empty = Snapshot::initialize(500, &mut ids).unwrap();
        let out = compact(&empty, &mut ids);
        assert_eq!(out.snapshot, empty);
        assert_eq!(out.cursor, 0);

        let job = JobName::new("FULL").unwrap();
        let full = allocate(&empty, &job, 500, PlacementPolicy::FirstFit, 0, &mut ids)
            .unwrap()
            .snapshot;
        let out = compact(&full, &mut ids);
        assert_eq!(out.snapshot.free_count(), 0);
        assert_eq!(out.cursor, 500);
        out.snapshot.verify_partition().unwrap();
    }

    #[test]
    fn test_compact_replaces_split_free_set() {
        let mut ids = SequentialIds::new();
        let snap = scattered(&mut ids);
        let old_ids: Vec<_> = snap.free_segments().map(|s| s.id).collect();

        let out = compact(&snap, &mut ids);
        let trailing = out.snapshot.free_segments().next().unwrap();
        assert!(!old_ids.contains(&trailing.id));
    }
}
