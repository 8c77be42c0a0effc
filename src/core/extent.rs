//! Address ranges within the simulated address space
//!
//! An [`Extent`] is the placement-level view of a segment: just where it starts
//! and how long it is. Placement policies only ever see extents.

use serde::{Deserialize, Serialize};

/// A contiguous range of addresses `[start, start + length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    /// First address covered
    pub start: u64,
    /// Number of addresses covered
    pub length: u64,
}

impl Extent {
    pub fn new(start: u64, length: u64) -> Self {
        Extent { start, length }
    }

    /// One past the last covered address
    pub fn end(&self) -> u64 {
        self.start + self.length
    }

    /// Check if this extent contains an address
    pub fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end()
    }

    /// Check if this extent ends exactly where `next` begins
    pub fn precedes(&self, next: &Extent) -> bool {
        self.end() == next.start
    }

    /// Check if this extent is adjacent to another (either side)
    pub fn is_adjacent(&self, other: &Extent) -> bool {
        self.precedes(other) || other.precedes(self)
    }

    /// Coalesce two adjacent extents
    pub fn coalesce(&self, other: &Extent) -> Option<Extent> {
        if !self.is_adjacent(other) {
            return None;
        }

        let start = self.start.min(other.start);
        Some(Extent {
            start,
            length: self.length + other.length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_contains() {
        let extent = Extent::new(10, 20);
        assert!(!extent.contains(9));
        assert!(extent.contains(10));
        assert!(extent.contains(29));
        assert!(!extent.contains(30));
    }

    #[test]
    fn test_extent_adjacency() {
        let e1 = Extent::new(10, 10);
        let e2 = Extent::new(20, 10);
        let e3 = Extent::new(30, 10);

        assert!(e1.precedes(&e2));
        assert!(!e2.precedes(&e1));
        assert!(e2.is_adjacent(&e1));
        assert!(e2.is_adjacent(&e3));
        assert!(!e1.is_adjacent(&e3));
    }

    #[test]
    fn test_extent_coalesce() {
        let e1 = Extent::new(10, 10);
        let e2 = Extent::new(20, 10);

        assert_eq!(e2.coalesce(&e1), Some(Extent::new(10, 20)));
        assert_eq!(e1.coalesce(&Extent::new(40, 5)), None);
    }
}
