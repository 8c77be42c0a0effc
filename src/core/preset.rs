//! Built-in operation scripts
//!
//! Two classic workloads ship with the simulator: the standard lab exercise
//! and a fragmentation demo that only succeeds after compaction. Each is plain
//! [`Operation`] data; replay one with [`crate::Simulation::run`].

use crate::operation::Operation;
use serde::Serialize;

/// A named, replayable sequence of operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub operations: Vec<Operation>,
}

impl Preset {
    /// Standard lab exercise covering basic allocation and release
    ///
    /// Against 100 000 units with first fit, `H` (90 000 units) fails and
    /// every other step succeeds.
    pub fn lab_exercise() -> Self {
        Preset {
            id: "lab-exercise",
            name: "Standard lab exercise",
            description: "Allocate A-E, free B and E, refill the holes, then free most jobs.",
            operations: vec![
                Operation::allocate("A", 3000),
                Operation::allocate("B", 3000),
                Operation::allocate("C", 5000),
                Operation::allocate("D", 15000),
                Operation::allocate("E", 2000),
                Operation::deallocate("B"),
                Operation::allocate("F", 4000),
                Operation::deallocate("E"),
                Operation::allocate("H", 90000),
                Operation::allocate("G", 1500),
                Operation::deallocate("D"),
                Operation::deallocate("G"),
                Operation::deallocate("A"),
            ],
        }
    }

    /// External fragmentation blocks `BIG` until compaction merges the holes
    pub fn fragmentation_demo() -> Self {
        Preset {
            id: "fragmentation",
            name: "Fragmentation and compaction",
            description: "Split free space into small holes until BIG fails, then compact and retry.",
            operations: vec![
                Operation::allocate("J1", 10000),
                Operation::allocate("J2", 10000),
                Operation::allocate("J3", 10000),
                Operation::allocate("J4", 10000),
                Operation::allocate("J5", 10000),
                Operation::deallocate("J2"),
                Operation::deallocate("J4"),
                Operation::allocate("K1", 45000),
                Operation::allocate("BIG", 15000),
                Operation::Compact,
                Operation::allocate("BIG", 15000),
            ],
        }
    }

    pub fn all() -> Vec<Preset> {
        vec![Self::lab_exercise(), Self::fragmentation_demo()]
    }

    /// Look up a preset by its id
    pub fn by_id(id: &str) -> Option<Preset> {
        Self::all().into_iter().find(|p| p.id == id)
    }
}
