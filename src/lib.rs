//! # partition-sim - Contiguous Partition Allocation Simulator
//!
//! `partition-sim` models one fixed-size, contiguous address space carved into
//! free and allocated segments. It provides:
//!
//! - **Four placement policies**: first fit, best fit, worst fit and next fit
//! - **Coalescing** of adjacent free segments on deallocation
//! - **Compaction** that slides every job down and leaves one trailing hole
//! - **External fragmentation** metric and usage statistics
//!
//! The engine in [`core`] is a set of pure functions over [`Snapshot`] values.
//! [`Simulation`] is a small driver that owns the current snapshot, the
//! next-fit cursor and the segment id source.
//!
//! ## Quick Start
//!
//! ```rust
//! use partition_sim::{PlacementPolicy, Result, Simulation};
//!
//! # fn main() -> Result<()> {
//! let mut sim = Simulation::builder()
//!     .total_memory(100_000)
//!     .policy(PlacementPolicy::FirstFit)
//!     .build()?;
//!
//! sim.allocate("A", 3000)?;
//! sim.allocate("B", 3000)?;
//! sim.deallocate("A")?;
//!
//! assert_eq!(sim.snapshot().free_count(), 2);
//! assert!(sim.fragmentation() > 0.0);
//!
//! sim.compact();
//! assert_eq!(sim.fragmentation(), 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pure API
//!
//! ```rust
//! use partition_sim::{allocate, JobName, PlacementPolicy, SequentialIds, Snapshot};
//!
//! # fn main() -> partition_sim::Result<()> {
//! let mut ids = SequentialIds::new();
//! let empty = Snapshot::initialize(1024, &mut ids)?;
//!
//! let job = JobName::new("J1")?;
//! let out = allocate(&empty, &job, 256, PlacementPolicy::BestFit, 0, &mut ids)?;
//! assert_eq!(out.segment.start, 0);
//! assert_eq!(out.cursor, 256);
//!
//! // The input snapshot is never modified
//! assert_eq!(empty.total_free(), 1024);
//! # Ok(())
//! # }
//! ```

pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use crate::core::{
    allocate, allocator, compact, config, deallocate, error, extent, fragmentation, operation,
    preset, segment, store, validation,
};

pub use crate::core::{
    allocate::{allocate, Allocation},
    allocator::{Placement, PlacementPolicy},
    compact::{compact, Compaction},
    config::SimulationConfig,
    deallocate::{deallocate, Deallocation},
    error::{ErrorKind, PartitionError, Result},
    extent::Extent,
    fragmentation::{fragmentation, FreeSpaceStats},
    operation::{Operation, Outcome},
    preset::Preset,
    segment::{IdSource, RandomIds, Segment, SegmentId, SegmentKind, SequentialIds},
    store::{Snapshot, DEFAULT_TOTAL_MEMORY},
    validation::JobName,
};

use std::fmt;
use tracing::{debug, info, warn};

/// Driver holding the current state of one simulated address space
///
/// Every operation runs against the current snapshot and, on success,
/// replaces it. A failed operation leaves snapshot and cursor untouched.
pub struct Simulation {
    snapshot: Snapshot,
    cursor: u64,
    policy: PlacementPolicy,
    ids: Box<dyn IdSource + Send>,
}

impl Simulation {
    /// Create a simulation from a configuration, with sequential segment ids
    ///
    /// # Examples
    ///
    /// ```rust
    /// use partition_sim::{Simulation, SimulationConfig};
    ///
    /// let sim = Simulation::new(SimulationConfig::default())?;
    /// assert_eq!(sim.snapshot().total_free(), 100_000);
    /// # Ok::<(), partition_sim::PartitionError>(())
    /// ```
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Self::with_id_source(config, Box::new(SequentialIds::new()))
    }

    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    fn with_id_source(config: SimulationConfig, mut ids: Box<dyn IdSource + Send>) -> Result<Self> {
        config.validate()?;
        info!(
            "Creating simulation: {} units, policy {}",
            config.total_memory, config.policy
        );
        let snapshot = Snapshot::initialize(config.total_memory, &mut ids)?;
        Ok(Simulation {
            snapshot,
            cursor: 0,
            policy: config.policy,
            ids,
        })
    }

    /// Resume from a saved snapshot
    ///
    /// The snapshot is verified first. Fresh ids continue after the highest
    /// id it contains.
    pub fn from_snapshot(snapshot: Snapshot, cursor: u64, policy: PlacementPolicy) -> Result<Self> {
        snapshot.verify_partition()?;
        let next = snapshot.max_id().map_or(0, |id| id.get() + 1);
        info!(
            "Restoring simulation: {} segments, cursor {}",
            snapshot.free_count() + snapshot.allocated_count(),
            cursor
        );
        Ok(Simulation {
            snapshot,
            cursor,
            policy,
            ids: Box::new(SequentialIds::starting_at(next)),
        })
    }

    /// Allocate `size` units to `job` with the configured policy
    pub fn allocate(&mut self, job: &str, size: u64) -> Result<Allocation> {
        self.allocate_with(job, size, self.policy)
    }

    /// Allocate `size` units to `job` with an explicit policy
    pub fn allocate_with(
        &mut self,
        job: &str,
        size: u64,
        policy: PlacementPolicy,
    ) -> Result<Allocation> {
        let job = JobName::new(job)?;
        let allocation = allocate(&self.snapshot, &job, size, policy, self.cursor, &mut self.ids)?;
        self.snapshot = allocation.snapshot.clone();
        self.cursor = allocation.cursor;
        Ok(allocation)
    }

    /// Release the segment owned by `job`
    ///
    /// The name is matched exactly; anything no job owns is `JobNotFound`.
    pub fn deallocate(&mut self, job: &str) -> Result<Deallocation> {
        let deallocation = deallocate(&self.snapshot, job, &mut self.ids)?;
        self.snapshot = deallocation.snapshot.clone();
        Ok(deallocation)
    }

    /// Compact the address space and reset the cursor past the last job
    pub fn compact(&mut self) -> Compaction {
        let compaction = compact(&self.snapshot, &mut self.ids);
        self.snapshot = compaction.snapshot.clone();
        self.cursor = compaction.cursor;
        compaction
    }

    /// Apply one operation, reporting failure in the outcome
    pub fn apply(&mut self, op: &Operation) -> Outcome {
        let result = match op {
            Operation::Allocate { job, size, policy } => self
                .allocate_with(job, *size, policy.unwrap_or(self.policy))
                .map(|a| a.message),
            Operation::Deallocate { job } => self.deallocate(job).map(|d| d.message),
            Operation::Compact => Ok(self.compact().message),
        };

        match result {
            Ok(message) => {
                debug!("{}", message);
                Outcome {
                    ok: true,
                    message,
                    error_kind: None,
                    cursor: self.cursor,
                }
            }
            Err(e) => {
                warn!("Operation {:?} failed: {}", op, e);
                Outcome {
                    ok: false,
                    message: e.to_string(),
                    error_kind: Some(e.kind()),
                    cursor: self.cursor,
                }
            }
        }
    }

    /// Apply each operation in order, continuing past failures
    ///
    /// ```rust
    /// use partition_sim::{Preset, Simulation};
    ///
    /// let mut sim = Simulation::builder().build()?;
    /// let outcomes = sim.run(&Preset::fragmentation_demo().operations);
    /// assert!(!outcomes[8].ok);
    /// assert!(outcomes[10].ok);
    /// # Ok::<(), partition_sim::PartitionError>(())
    /// ```
    pub fn run(&mut self, ops: &[Operation]) -> Vec<Outcome> {
        ops.iter().map(|op| self.apply(op)).collect()
    }

    /// Return to a single free segment with the cursor at 0
    pub fn reset(&mut self) -> Result<()> {
        info!("Resetting simulation");
        self.snapshot = Snapshot::initialize(self.snapshot.total_memory(), &mut self.ids)?;
        self.cursor = 0;
        Ok(())
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Next-fit cursor
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: PlacementPolicy) {
        debug!("Placement policy set to {}", policy);
        self.policy = policy;
    }

    pub fn fragmentation(&self) -> f64 {
        fragmentation(&self.snapshot)
    }

    pub fn stats(&self) -> FreeSpaceStats {
        self.snapshot.stats()
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("snapshot", &self.snapshot)
            .field("cursor", &self.cursor)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a Simulation with custom settings
///
/// # Examples
///
/// ```rust
/// use partition_sim::{PlacementPolicy, RandomIds, Simulation};
///
/// let sim = Simulation::builder()
///     .total_memory(4096)
///     .policy(PlacementPolicy::NextFit)
///     .id_source(RandomIds::seeded(42))
///     .build()?;
/// assert_eq!(sim.policy(), PlacementPolicy::NextFit);
/// # Ok::<(), partition_sim::PartitionError>(())
/// ```
#[derive(Default)]
pub struct SimulationBuilder {
    config: SimulationConfig,
    ids: Option<Box<dyn IdSource + Send>>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every setting with a loaded configuration
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn total_memory(mut self, total_memory: u64) -> Self {
        self.config.total_memory = total_memory;
        self
    }

    pub fn policy(mut self, policy: PlacementPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Use a custom segment id source (defaults to [`SequentialIds`])
    pub fn id_source<I: IdSource + Send + 'static>(mut self, ids: I) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn build(self) -> Result<Simulation> {
        let ids = self.ids.unwrap_or_else(|| Box::new(SequentialIds::new()));
        Simulation::with_id_source(self.config, ids)
    }
}
