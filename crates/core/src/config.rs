//! Simulation configuration.
//!
//! Mirrors the layered-defaults convention used throughout this codebase: a
//! private [`defaults`] module holds the baseline values, and [`Config`]
//! validates every field against its enumerated legal set at construction
//! time rather than deep in the simulation loop.
//!
//! # Examples
//!
//! ```
//! use procsim_core::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.pregs, 64);
//! assert_eq!(config.rob_entries(), 96);
//! ```

use crate::common::error::SimError;

/// Default configuration constants for the simulator.
///
/// These values define the baseline machine configuration when not
/// explicitly overridden from the command line.
mod defaults {
    /// Default fetch width (instructions requested from the oracle per cycle).
    pub const FETCH_WIDTH: usize = 2;

    /// Default scheduling-queue slots reserved per functional unit.
    pub const SCHEDQ_SLOTS_PER_FU: usize = 2;

    /// Default physical register count beyond the 32 architectural ones.
    pub const PREGS: usize = 64;

    /// Default number of ALU pipes.
    pub const ALU_UNITS: usize = 2;

    /// Default number of MUL pipes.
    pub const MUL_UNITS: usize = 1;

    /// Default number of LSU pipes.
    pub const LSU_UNITS: usize = 2;

    /// Miss modeling is enabled by default.
    pub const DISABLE_MISS_MODELING: bool = false;
}

/// Root configuration for a simulation run.
///
/// Every numeric field is restricted to the small enumerated set the
/// external CLI accepts; [`Config::new`] is the only path to construction,
/// so every other piece of code can treat a live `Config` as already-valid.
///
/// # Examples
///
/// ```
/// use procsim_core::config::Config;
///
/// let config = Config::new(4, 4, 96, 2, 1, 2, false).unwrap();
/// assert_eq!(config.rob_entries(), 128);
/// assert_eq!(config.sched_queue_capacity(), 4 * (2 + 1 + 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Instructions requested from the fetch oracle per cycle.
    pub fetch_width: usize,
    /// Scheduling-queue slots reserved per functional unit.
    pub sched_slots_per_fu: usize,
    /// Physical registers beyond the 32 architectural ones.
    pub pregs: usize,
    /// Number of ALU pipes.
    pub alu_units: usize,
    /// Number of MUL pipes.
    pub mul_units: usize,
    /// Number of LSU pipes.
    pub lsu_units: usize,
    /// When set, the fetch oracle reports no mispredicts or icache misses,
    /// and execute treats every load as a data-cache hit.
    pub disable_miss_modeling: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_width: defaults::FETCH_WIDTH,
            sched_slots_per_fu: defaults::SCHEDQ_SLOTS_PER_FU,
            pregs: defaults::PREGS,
            alu_units: defaults::ALU_UNITS,
            mul_units: defaults::MUL_UNITS,
            lsu_units: defaults::LSU_UNITS,
            disable_miss_modeling: defaults::DISABLE_MISS_MODELING,
        }
    }
}

impl Config {
    /// Builds a configuration, validating every field against its legal set.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidConfig`] naming the first field found
    /// outside its enumerated set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fetch_width: usize,
        sched_slots_per_fu: usize,
        pregs: usize,
        alu_units: usize,
        mul_units: usize,
        lsu_units: usize,
        disable_miss_modeling: bool,
    ) -> Result<Self, SimError> {
        let config = Self {
            fetch_width,
            sched_slots_per_fu,
            pregs,
            alu_units,
            mul_units,
            lsu_units,
            disable_miss_modeling,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SimError> {
        if ![2, 4, 8].contains(&self.fetch_width) {
            return Err(SimError::InvalidConfig(format!(
                "fetch width must be one of 2, 4, 8 (got {})",
                self.fetch_width
            )));
        }
        if ![2, 4, 8].contains(&self.sched_slots_per_fu) {
            return Err(SimError::InvalidConfig(format!(
                "scheduling slots per FU must be one of 2, 4, 8 (got {})",
                self.sched_slots_per_fu
            )));
        }
        if ![64, 96, 128].contains(&self.pregs) {
            return Err(SimError::InvalidConfig(format!(
                "physical register count must be one of 64, 96, 128 (got {})",
                self.pregs
            )));
        }
        if ![1, 2, 3].contains(&self.alu_units) {
            return Err(SimError::InvalidConfig(format!(
                "ALU unit count must be one of 1, 2, 3 (got {})",
                self.alu_units
            )));
        }
        if ![1, 2].contains(&self.mul_units) {
            return Err(SimError::InvalidConfig(format!(
                "MUL unit count must be one of 1, 2 (got {})",
                self.mul_units
            )));
        }
        if ![1, 2, 3].contains(&self.lsu_units) {
            return Err(SimError::InvalidConfig(format!(
                "LSU unit count must be one of 1, 2, 3 (got {})",
                self.lsu_units
            )));
        }
        Ok(())
    }

    /// Reorder-buffer capacity: `pregs + 32` architectural registers.
    #[must_use]
    pub fn rob_entries(&self) -> usize {
        self.pregs + crate::common::constants::NUM_ARCH_REGS
    }

    /// Scheduling-queue capacity: `sched_slots_per_fu * (alu + mul + lsu)`.
    #[must_use]
    pub fn sched_queue_capacity(&self) -> usize {
        self.sched_slots_per_fu * (self.alu_units + self.mul_units + self.lsu_units)
    }
}
