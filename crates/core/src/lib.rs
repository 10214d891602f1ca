//! Out-of-order processor backend simulator library.
//!
//! This crate implements a cycle-accurate Tomasulo-style backend model:
//! 1. **Core:** register renaming (RAT + physical register file), a unified
//!    reservation-station scheduling queue, a reorder buffer, a store
//!    buffer, and fixed-depth ALU/MUL/LSU functional-unit pipes, driven one
//!    cycle at a time in reverse program order (retire, execute, schedule,
//!    dispatch, fetch).
//! 2. **ISA:** the five-opcode trace instruction format this backend consumes.
//! 3. **Trace:** the trace-file loader.
//! 4. **Fetch:** the fetch-oracle abstraction and its trace-backed implementation.
//! 5. **Stats:** cycle/IPC counters, cache and forwarding ratios, stall breakdowns.

/// Common types and constants (machine-model constants, error enum).
pub mod common;
/// Simulation configuration (defaults, validated construction).
pub mod config;
/// The out-of-order backend: register renaming and the pipeline engine.
pub mod core;
/// The fetch-oracle abstraction and its trace-backed implementation.
pub mod fetch;
/// Instruction set: opcode encoding and the trace instruction record.
pub mod isa;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Trace-file loading.
pub mod trace;

/// Root configuration type.
pub use crate::config::Config;
/// The backend engine; owns every pipeline structure and drives one cycle
/// at a time via [`core::Core::do_cycle`].
pub use crate::core::Core;
/// The fetch-oracle trait and its trace-backed implementation.
pub use crate::fetch::{FetchOracle, TraceFetchOracle};
/// Error type surfaced at the trace/config boundary.
pub use crate::common::SimError;
/// Accumulated and finalized simulation statistics.
pub use crate::stats::{FinalStats, SimStats};
