//! Segments and their identities
//!
//! A segment keeps its [`SegmentId`] while it is shrunk by a partial
//! allocation or slid by compaction. Splitting off, merging or creating a
//! segment always draws a fresh id from an [`IdSource`].

use crate::extent::Extent;
use crate::validation::JobName;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Opaque, stable identity of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(u64);

impl SegmentId {
    pub fn new(raw: u64) -> Self {
        SegmentId(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Whether a segment is free or owned by a job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SegmentKind {
    Free,
    Allocated { job: JobName },
}

/// A labeled, addressed, sized region of the address space
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub start: u64,
    pub length: u64,
    #[serde(flatten)]
    pub kind: SegmentKind,
}

impl Segment {
    pub fn free(id: SegmentId, start: u64, length: u64) -> Self {
        Segment {
            id,
            start,
            length,
            kind: SegmentKind::Free,
        }
    }

    pub fn allocated(id: SegmentId, start: u64, length: u64, job: JobName) -> Self {
        Segment {
            id,
            start,
            length,
            kind: SegmentKind::Allocated { job },
        }
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.start, self.length)
    }

    pub fn end(&self) -> u64 {
        self.start + self.length
    }

    pub fn is_free(&self) -> bool {
        matches!(self.kind, SegmentKind::Free)
    }

    /// Job owning this segment, if allocated
    pub fn job(&self) -> Option<&JobName> {
        match &self.kind {
            SegmentKind::Allocated { job } => Some(job),
            SegmentKind::Free => None,
        }
    }

    /// Drop the first `amount` addresses, keeping the identity
    ///
    /// Caller guarantees `amount < self.length`.
    pub(crate) fn shrink_front(&mut self, amount: u64) {
        debug_assert!(amount < self.length);
        self.start += amount;
        self.length -= amount;
    }

    /// Move to a new start address, keeping the identity
    pub(crate) fn slide_to(&mut self, start: u64) {
        self.start = start;
    }
}

/// Factory for fresh segment identities
///
/// Substitute a deterministic source in tests; the driver defaults to
/// [`SequentialIds`].
pub trait IdSource {
    fn next_id(&mut self) -> SegmentId;
}

/// Monotonic counter ids
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering from `next`, e.g. after restoring a saved snapshot
    pub fn starting_at(next: u64) -> Self {
        SequentialIds { next }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> SegmentId {
        let id = SegmentId(self.next);
        self.next += 1;
        id
    }
}

/// Random 64-bit ids, never repeating within one source
#[derive(Debug)]
pub struct RandomIds {
    rng: StdRng,
    issued: HashSet<u64>,
}

impl RandomIds {
    pub fn new() -> Self {
        RandomIds {
            rng: StdRng::from_entropy(),
            issued: HashSet::new(),
        }
    }

    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        RandomIds {
            rng: StdRng::seed_from_u64(seed),
            issued: HashSet::new(),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for RandomIds {
    fn next_id(&mut self) -> SegmentId {
        loop {
            let raw: u64 = self.rng.gen();
            if self.issued.insert(raw) {
                return SegmentId(raw);
            }
        }
    }
}

impl<T: IdSource + ?Sized> IdSource for &mut T {
    fn next_id(&mut self) -> SegmentId {
        (**self).next_id()
    }
}

impl<T: IdSource + ?Sized> IdSource for Box<T> {
    fn next_id(&mut self) -> SegmentId {
        (**self).next_id()
    }
}
