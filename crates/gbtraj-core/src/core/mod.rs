//! Provides the foundational layer of the library.
//!
//! This module contains the stateless data models for trajectory snapshots and
//! the streaming I/O machinery for the LAMMPS dump text format.

pub mod io;
pub mod models;
