//! Defines the core data structures for trajectory data.
//!
//! This module contains the in-memory representation of parsed trajectory
//! data: per-atom columnar storage, single-timestep snapshots, and the
//! ordered multi-snapshot trajectory collection.

pub mod column;
pub mod snapshot;
pub mod trajectory;
