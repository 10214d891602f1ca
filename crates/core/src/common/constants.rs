//! Machine-model constants fixed by the backend design (not configurable via CLI).
//!
//! 1. **Timing:** functional-unit pipe depths and the data-cache miss penalty.
//! 2. **Sizing:** the fixed architectural register count.
//! 3. **Watchdog:** the deadlock threshold the embedding binary enforces.

/// Number of architectural registers. Register 0 is a constant zero.
pub const NUM_ARCH_REGS: usize = 32;

/// Cycles an LSU pipe takes for an L1 data-cache hit (also its pipe depth).
pub const L1_HIT_TIME: u32 = 2;

/// Extra cycles added to an LSU completion on a data-cache miss.
pub const L1_MISS_PENALTY: u32 = 10;

/// Pipe depth for ALU functional units.
pub const ALU_STAGES: u32 = 1;

/// Pipe depth for MUL functional units.
pub const MUL_STAGES: u32 = 3;

/// Consecutive cycles with zero retirement before the embedding program
/// treats the run as deadlocked.
pub const DEADLOCK_THRESHOLD: u64 = 128;
