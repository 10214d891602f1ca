//! The fetch oracle: supplies one instruction at a time and models the
//! i-cache-miss stall window and mispredict-in-flight suppression that the
//! core's fetch stage treats as an opaque external collaborator.

use crate::common::constants::L1_MISS_PENALTY;
use crate::isa::Instruction;

/// Supplies the next instruction to fetch, or `None` when fetch should stop
/// for this cycle.
///
/// `None` is returned for one of three reasons: end of trace, an i-cache
/// miss stall is in progress, or a mispredict is in flight and later
/// instructions are being suppressed until it retires.
pub trait FetchOracle {
    /// Returns the next instruction to deliver to dispatch, or `None`.
    fn next(&mut self) -> Option<Instruction>;

    /// Advances any cycle-scoped internal state (the i-cache-miss
    /// countdown). Called exactly once per simulator cycle, regardless of
    /// how many times `next` was called that cycle.
    fn end_of_cycle(&mut self);

    /// Called by the core when the retired instruction at the head of the
    /// ROB had `mispredict=true`. Clears the in-flight mispredict
    /// suppression so fetch can resume.
    fn notify_mispredict_retired(&mut self);

    /// True while an i-cache-miss stall window is counting down.
    ///
    /// The core's fetch stage watches this flag's false-to-true transition
    /// to bump `icache_misses` — the oracle owns the timing, the core only
    /// observes it, per the out-of-band-flag contract in section 6.
    fn is_icache_miss_in_flight(&self) -> bool;
}

/// A [`FetchOracle`] backed by a preloaded trace.
pub struct TraceFetchOracle {
    trace: Vec<Instruction>,
    next_idx: usize,
    /// Set while an i-cache-miss stall window is counting down.
    icache_miss_in_flight: bool,
    /// Cycles remaining in the current i-cache-miss stall window.
    icache_miss_countdown: u32,
    /// Set from the moment a mispredicted branch is delivered until the
    /// core signals it has retired.
    mispredict_in_flight: bool,
}

impl TraceFetchOracle {
    /// Builds an oracle that will deliver `trace` in order.
    #[must_use]
    pub fn new(trace: Vec<Instruction>) -> Self {
        Self {
            trace,
            next_idx: 0,
            icache_miss_in_flight: false,
            icache_miss_countdown: 0,
            mispredict_in_flight: false,
        }
    }

    /// True once every instruction in the trace has been delivered.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next_idx >= self.trace.len()
    }

    /// Total number of instructions in the trace.
    #[must_use]
    pub fn instructions_in_trace(&self) -> usize {
        self.trace.len()
    }
}

impl FetchOracle for TraceFetchOracle {
    fn next(&mut self) -> Option<Instruction> {
        if self.mispredict_in_flight || self.icache_miss_in_flight {
            return None;
        }
        let inst = *self.trace.get(self.next_idx)?;

        if inst.icache_miss {
            self.icache_miss_in_flight = true;
            self.icache_miss_countdown = L1_MISS_PENALTY;
            return None;
        }

        self.next_idx += 1;
        if inst.mispredict {
            self.mispredict_in_flight = true;
        }
        Some(inst)
    }

    fn end_of_cycle(&mut self) {
        if !self.icache_miss_in_flight {
            return;
        }
        self.icache_miss_countdown -= 1;
        if self.icache_miss_countdown == 0 {
            self.icache_miss_in_flight = false;
        }
    }

    fn notify_mispredict_retired(&mut self) {
        self.mispredict_in_flight = false;
    }

    fn is_icache_miss_in_flight(&self) -> bool {
        self.icache_miss_in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Opcode;

    fn inst(dyn_id: u64, icache_miss: bool, mispredict: bool) -> Instruction {
        Instruction {
            pc: dyn_id * 4,
            opcode: Opcode::Add,
            dest: 1,
            src1: -1,
            src2: -1,
            addr: 0,
            dyn_id,
            mispredict,
            icache_miss,
            dcache_miss: false,
        }
    }

    #[test]
    fn delivers_instructions_in_order() {
        let mut oracle = TraceFetchOracle::new(vec![inst(0, false, false), inst(1, false, false)]);
        assert_eq!(oracle.next().unwrap().dyn_id, 0);
        assert_eq!(oracle.next().unwrap().dyn_id, 1);
        assert!(oracle.next().is_none());
    }

    #[test]
    fn icache_miss_stalls_for_exactly_the_miss_penalty() {
        let mut oracle = TraceFetchOracle::new(vec![inst(0, true, false)]);
        // Triggering instruction is withheld the cycle the miss is detected.
        assert!(oracle.next().is_none());

        for _ in 0..(L1_MISS_PENALTY - 1) {
            oracle.end_of_cycle();
            assert!(oracle.next().is_none());
        }
        oracle.end_of_cycle();
        assert_eq!(oracle.next().unwrap().dyn_id, 0);
    }

    #[test]
    fn countdown_ticks_once_per_cycle_not_per_call() {
        let mut oracle = TraceFetchOracle::new(vec![inst(0, true, false)]);
        let _ = oracle.next();
        // Multiple fetch-width calls within the same cycle must not
        // double-decrement the countdown.
        for _ in 0..4 {
            assert!(oracle.next().is_none());
        }
        oracle.end_of_cycle();
        assert_eq!(oracle.icache_miss_countdown, L1_MISS_PENALTY - 1);
    }

    #[test]
    fn mispredict_suppresses_fetch_until_retirement_notice() {
        let mut oracle =
            TraceFetchOracle::new(vec![inst(0, false, true), inst(1, false, false)]);
        assert_eq!(oracle.next().unwrap().dyn_id, 0);
        assert!(oracle.next().is_none());
        oracle.notify_mispredict_retired();
        assert_eq!(oracle.next().unwrap().dyn_id, 1);
    }
}
