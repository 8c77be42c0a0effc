//! Partition engine
//!
//! Pure state transitions over [`store::Snapshot`]: allocate, deallocate,
//! compact, plus the fragmentation metric. Nothing here holds state between
//! calls; [`crate::Simulation`] owns the current snapshot.

pub mod allocate;
pub mod allocator;
pub mod compact;
pub mod config;
pub mod deallocate;
pub mod error;
pub mod extent;
pub mod fragmentation;
pub mod operation;
pub mod preset;
pub mod segment;
pub mod store;
pub mod validation;
