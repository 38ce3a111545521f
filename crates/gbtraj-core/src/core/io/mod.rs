//! Provides input/output functionality for trajectory file formats.
//!
//! This module contains the streaming machinery for reading and writing
//! line-oriented trajectory dumps: an explicit line cursor that owns the
//! shared read position, a trait-based interface for whole-file operations,
//! and the LAMMPS dump format implementation.

pub mod cursor;
pub mod lammps;
pub mod traits;
