//! Partition store
//!
//! A [`Snapshot`] is the complete state of one simulated address space: the
//! free segments and the allocated segments, each indexed by start address.
//! Together they always tile `[0, total_memory)` exactly. Snapshots are
//! values; every operation takes one by reference and returns a new one.

use crate::error::{PartitionError, Result};
use crate::extent::Extent;
use crate::segment::{IdSource, Segment, SegmentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Default size of the simulated address space
pub const DEFAULT_TOTAL_MEMORY: u64 = 100_000;

/// Immutable view of a partitioned address space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    total_memory: u64,

    /// Free segments indexed by start address
    free: BTreeMap<u64, Segment>,

    /// Allocated segments indexed by start address
    allocated: BTreeMap<u64, Segment>,
}

impl Snapshot {
    /// A single free segment spanning the whole address space
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `total_memory` is zero.
    pub fn initialize(total_memory: u64, ids: &mut impl IdSource) -> Result<Self> {
        if total_memory == 0 {
            return Err(PartitionError::InvalidConfig(
                "total memory must be greater than 0".to_string(),
            ));
        }

        let mut free = BTreeMap::new();
        free.insert(0, Segment::free(ids.next_id(), 0, total_memory));

        info!("Initialized address space of {} units", total_memory);

        Ok(Snapshot {
            total_memory,
            free,
            allocated: BTreeMap::new(),
        })
    }

    pub(crate) fn from_parts(
        total_memory: u64,
        free: BTreeMap<u64, Segment>,
        allocated: BTreeMap<u64, Segment>,
    ) -> Self {
        let snapshot = Snapshot {
            total_memory,
            free,
            allocated,
        };
        debug_assert!(snapshot.verify_partition().is_ok());
        snapshot
    }

    pub(crate) fn free_map(&self) -> &BTreeMap<u64, Segment> {
        &self.free
    }

    pub(crate) fn allocated_map(&self) -> &BTreeMap<u64, Segment> {
        &self.allocated
    }

    pub fn total_memory(&self) -> u64 {
        self.total_memory
    }

    /// Sum of all free segment lengths
    pub fn total_free(&self) -> u64 {
        self.free.values().map(|s| s.length).sum()
    }

    /// Sum of all allocated segment lengths
    pub fn total_allocated(&self) -> u64 {
        self.allocated.values().map(|s| s.length).sum()
    }

    /// Length of the largest free segment, 0 if there is none
    pub fn largest_free_block(&self) -> u64 {
        self.free.values().map(|s| s.length).max().unwrap_or(0)
    }

    /// Free segments in ascending address order
    pub fn free_segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.free.values()
    }

    /// Allocated segments in ascending address order
    pub fn allocated_segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.allocated.values()
    }

    /// Extents of the free segments in ascending address order
    pub fn free_extents(&self) -> Vec<Extent> {
        self.free.values().map(Segment::extent).collect()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }

    /// Every segment, free and allocated, in ascending address order
    pub fn segments(&self) -> Vec<&Segment> {
        let mut all: Vec<&Segment> = self.free.values().chain(self.allocated.values()).collect();
        all.sort_by_key(|s| s.start);
        all
    }

    /// Allocated segment owned by `job`
    pub fn find_job(&self, job: &str) -> Option<&Segment> {
        self.allocated
            .values()
            .find(|s| s.job().map(|j| j.as_str()) == Some(job))
    }

    /// Segment covering `address`
    pub fn segment_at(&self, address: u64) -> Option<&Segment> {
        self.free
            .range(..=address)
            .next_back()
            .into_iter()
            .chain(self.allocated.range(..=address).next_back())
            .find(|(_, s)| s.extent().contains(address))
            .map(|(_, s)| s)
    }

    pub fn find_segment(&self, id: SegmentId) -> Option<&Segment> {
        self.free
            .values()
            .chain(self.allocated.values())
            .find(|s| s.id == id)
    }

    /// All allocations packed from address 0 with at most one trailing free segment
    pub fn is_compacted(&self) -> bool {
        let used = self.total_allocated();
        let packed = self
            .allocated
            .values()
            .try_fold(0u64, |next, s| {
                (s.start == next).then(|| next.checked_add(s.length)).flatten()
            })
            .is_some();

        packed
            && match self.free.len() {
                0 => used == self.total_memory,
                1 => self.free.contains_key(&used),
                _ => false,
            }
    }

    /// Check the partition invariant
    ///
    /// Segments are non-empty, pairwise disjoint, cover `[0, total_memory)`
    /// without gaps, sit under their own start key, and job names are unique.
    pub fn verify_partition(&self) -> Result<()> {
        if self.total_memory == 0 {
            return Err(PartitionError::CorruptSnapshot(
                "total memory is 0".to_string(),
            ));
        }

        for (&key, seg) in self.free.iter().chain(self.allocated.iter()) {
            if key != seg.start {
                return Err(PartitionError::CorruptSnapshot(format!(
                    "segment {} indexed at {} but starts at {}",
                    seg.id, key, seg.start
                )));
            }
            if seg.length == 0 {
                return Err(PartitionError::CorruptSnapshot(format!(
                    "segment {} at {} has zero length",
                    seg.id, seg.start
                )));
            }
        }

        if self.free.values().any(|s| !s.is_free()) || self.allocated.values().any(Segment::is_free)
        {
            return Err(PartitionError::CorruptSnapshot(
                "segment filed under the wrong kind".to_string(),
            ));
        }

        let mut expected = 0u64;
        for seg in self.segments() {
            if seg.start != expected {
                return Err(PartitionError::CorruptSnapshot(format!(
                    "expected segment at {}, found {} at {}",
                    expected, seg.id, seg.start
                )));
            }
            expected = seg.start.checked_add(seg.length).ok_or_else(|| {
                PartitionError::CorruptSnapshot(format!(
                    "segment {} at {} overflows the address space",
                    seg.id, seg.start
                ))
            })?;
        }
        if expected != self.total_memory {
            return Err(PartitionError::CorruptSnapshot(format!(
                "segments cover [0, {}) but total memory is {}",
                expected, self.total_memory
            )));
        }

        let mut jobs: Vec<&str> = self
            .allocated
            .values()
            .filter_map(|s| s.job().map(|j| j.as_str()))
            .collect();
        jobs.sort_unstable();
        if let Some(pair) = jobs.windows(2).find(|w| w[0] == w[1]) {
            return Err(PartitionError::CorruptSnapshot(format!(
                "job {} allocated twice",
                pair[0]
            )));
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot and verify the partition invariant
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.verify_partition()?;
        Ok(snapshot)
    }

    /// Highest id in use, for resuming a sequential id source
    pub fn max_id(&self) -> Option<SegmentId> {
        self.free
            .values()
            .chain(self.allocated.values())
            .map(|s| s.id)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SequentialIds;
    use crate::validation::JobName;

    fn job(name: &str) -> JobName {
        JobName::new(name).unwrap()
    }

    #[test]
    fn test_initialize() {
        let snap = Snapshot::initialize(1000, &mut SequentialIds::new()).unwrap();
        assert_eq!(snap.total_free(), 1000);
        assert_eq!(snap.largest_free_block(), 1000);
        assert_eq!(snap.free_count(), 1);
        assert_eq!(snap.allocated_count(), 0);
        assert!(snap.is_compacted());
        snap.verify_partition().unwrap();
    }

    #[test]
    fn test_initialize_zero_rejected() {
        let result = Snapshot::initialize(0, &mut SequentialIds::new());
        assert!(matches!(result, Err(PartitionError::InvalidConfig(_))));
    }

    #[test]
    fn test_queries() {
        let mut free = BTreeMap::new();
        free.insert(100, Segment::free(SegmentId::new(2), 100, 50));
        free.insert(200, Segment::free(SegmentId::new(3), 200, 300));
        let mut allocated = BTreeMap::new();
        allocated.insert(0, Segment::allocated(SegmentId::new(1), 0, 100, job("A")));
        allocated.insert(150, Segment::allocated(SegmentId::new(4), 150, 50, job("B")));
        let snap = Snapshot::from_parts(500, free, allocated);

        assert_eq!(snap.total_free(), 350);
        assert_eq!(snap.total_allocated(), 150);
        assert_eq!(snap.largest_free_block(), 300);
        assert_eq!(snap.find_job("B").unwrap().start, 150);
        assert!(snap.find_job("C").is_none());
        assert_eq!(snap.segment_at(120).unwrap().id, SegmentId::new(2));
        assert_eq!(snap.segment_at(199).unwrap().id, SegmentId::new(4));
        assert!(snap.segment_at(500).is_none());
        assert_eq!(snap.max_id(), Some(SegmentId::new(4)));
        assert_eq!(snap.find_segment(SegmentId::new(3)).unwrap().start, 200);
        assert_eq!(snap.find_segment(SegmentId::new(4)).unwrap().job().unwrap().as_str(), "B");
        assert!(snap.find_segment(SegmentId::new(9)).is_none());
        assert!(!snap.is_compacted());

        let starts: Vec<u64> = snap.segments().iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 100, 150, 200]);
    }

    #[test]
    fn test_verify_detects_gap() {
        let mut free = BTreeMap::new();
        free.insert(0, Segment::free(SegmentId::new(1), 0, 40));
        free.insert(50, Segment::free(SegmentId::new(2), 50, 50));
        let snap = Snapshot {
            total_memory: 100,
            free,
            allocated: BTreeMap::new(),
        };
        assert!(matches!(
            snap.verify_partition(),
            Err(PartitionError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_verify_detects_short_cover() {
        let mut free = BTreeMap::new();
        free.insert(0, Segment::free(SegmentId::new(1), 0, 90));
        let snap = Snapshot {
            total_memory: 100,
            free,
            allocated: BTreeMap::new(),
        };
        assert!(snap.verify_partition().is_err());
    }

    #[test]
    fn test_json_roundtrip_and_corrupt_rejection() {
        let snap = Snapshot::initialize(64, &mut SequentialIds::new()).unwrap();
        let json = snap.to_json().unwrap();
        assert_eq!(Snapshot::from_json(&json).unwrap(), snap);

        let broken = json.replace("\"length\": 64", "\"length\": 60");
        assert!(matches!(
            Snapshot::from_json(&broken),
            Err(PartitionError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_overflowing_segment() {
        let mut free = BTreeMap::new();
        free.insert(u64::MAX, Segment::free(SegmentId::new(2), u64::MAX, 1));
        let mut allocated = BTreeMap::new();
        allocated.insert(0, Segment::allocated(SegmentId::new(1), 0, u64::MAX, job("A")));
        let snap = Snapshot {
            total_memory: u64::MAX,
            free,
            allocated,
        };

        let json = serde_json::to_string(&snap).unwrap();
        assert!(matches!(
            Snapshot::from_json(&json),
            Err(PartitionError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_verify_rejects_zero_total() {
        let snap = Snapshot {
            total_memory: 0,
            free: BTreeMap::new(),
            allocated: BTreeMap::new(),
        };
        assert!(matches!(
            snap.verify_partition(),
            Err(PartitionError::CorruptSnapshot(_))
        ));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(Snapshot::from_json(&json).is_err());
    }
}
