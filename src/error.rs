//! Error types for the handful of operations that are programmer errors
//! rather than expected outcomes. Exhaustion and no-op user commands are *not*
//! represented here — see [`crate::solver::SolveOutcome`].
//!
//! Out-of-bounds coordinates are also a programmer error, but — matching
//! `Vec`/`Index`'s own convention — they're raised as a panic from
//! [`crate::grid::Grid::get`] rather than threaded through this enum as a
//! `Result`.

use thiserror::Error;

/// Fatal, non-recoverable-at-runtime errors: malformed constructor arguments and
/// a worker thread that's gone away. Propagation contradictions (deadends) are
/// never reported through this type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("grid dimensions must be nonzero, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("the worker thread has shut down")]
    WorkerDisconnected,
}
