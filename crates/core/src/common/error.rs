//! Error types surfaced by the simulator core and its embedding binary.
//!
//! The core itself has no recoverable runtime errors — every structural
//! invariant is enforced by the dispatch admission check before it could be
//! violated. `SimError` exists for the boundary concerns named in the design:
//! opening and parsing a trace file, validating a configuration, and the
//! watchdog deadlock.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can terminate a simulation run before or during execution.
#[derive(Debug, Error)]
pub enum SimError {
    /// The trace file could not be opened for reading.
    #[error("failed to open trace file {path}: {source}")]
    TraceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line in the trace file did not parse into a well-formed instruction record.
    #[error("malformed trace line {line_no} in {path}: {raw:?}")]
    MalformedTraceLine {
        path: PathBuf,
        line_no: usize,
        raw: String,
    },

    /// A configuration parameter fell outside its legal enumerated set.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No instruction retired for `cycles` consecutive cycles.
    #[error("deadlock: no retirement for {cycles} consecutive cycles")]
    Deadlock { cycles: u64 },
}
