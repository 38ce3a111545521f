//! Provides the high-level, user-facing entry points of the library.
//!
//! Workflows tie the parsed trajectory data and the selection strategies
//! together into complete operations, such as extracting the grain-boundary
//! subset of a snapshot.

pub mod boundary;
