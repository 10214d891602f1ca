//! The `Core`: owns every backend structure and drives one cycle at a time
//! through the reverse-program-order stage sequence (retire, execute,
//! schedule, dispatch, fetch) that lets each stage observe the previous
//! cycle's downstream state without explicit pipeline latches.

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::common::constants::DEADLOCK_THRESHOLD;
use crate::config::Config;
use crate::core::pipeline::entry::PipelineEntry;
use crate::core::pipeline::functional_units::{FuBank, FuClass};
use crate::core::pipeline::rob::Rob;
use crate::core::pipeline::sched_queue::SchedQueue;
use crate::core::pipeline::store_buffer::StoreBuffer;
use crate::core::regfile::{PhysRegFile, Rat};
use crate::fetch::FetchOracle;
use crate::isa::{Instruction, Opcode};
use crate::stats::SimStats;

/// One of the two named per-cycle dispatch stall reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchStall {
    None,
    RobFull,
    NoFreePreg,
}

/// Owns every backend structure: the dispatch queue, scheduling queue, ROB,
/// store buffer, functional-unit banks, register file, and RAT.
pub struct Core {
    config: Config,

    dispatch_queue: VecDeque<Instruction>,
    sched_queue: SchedQueue,
    rob: Rob,
    store_buffer: StoreBuffer,

    alu_bank: FuBank,
    mul_bank: FuBank,
    lsu_bank: FuBank,

    regs: PhysRegFile,
    rat: Rat,

    /// Stores retired in the previous cycle, popped from the store buffer
    /// at the start of this cycle's retire stage.
    stores_retired_prev_cycle: usize,

    /// Consecutive cycles with zero retirement. The embedding binary owns
    /// the hard watchdog; this is only tracked to emit a proximity warning.
    cycles_since_retirement: u64,
    near_deadlock_warned: bool,

    stats: SimStats,
}

impl Core {
    /// Builds a `Core` with empty structures sized per `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            dispatch_queue: VecDeque::new(),
            sched_queue: SchedQueue::new(config.sched_queue_capacity()),
            rob: Rob::new(config.rob_entries()),
            store_buffer: StoreBuffer::new(),
            alu_bank: FuBank::new(FuClass::Alu, config.alu_units),
            mul_bank: FuBank::new(FuClass::Mul, config.mul_units),
            lsu_bank: FuBank::new(FuClass::Lsu, config.lsu_units),
            regs: PhysRegFile::new(config.pregs),
            rat: Rat::new(),
            stores_retired_prev_cycle: 0,
            cycles_since_retirement: 0,
            near_deadlock_warned: false,
            stats: SimStats::default(),
        }
    }

    /// Accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Consecutive cycles since the last retirement, for the embedding
    /// binary's deadlock watchdog.
    #[must_use]
    pub fn cycles_since_retirement(&self) -> u64 {
        self.cycles_since_retirement
    }

    /// True once every structure is empty: the oracle-driven caller can
    /// treat this, combined with trace exhaustion, as "simulation done".
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.dispatch_queue.is_empty() && self.sched_queue.is_empty() && self.rob.is_empty()
    }

    /// Runs one full cycle: retire, then (unless a mispredict just retired)
    /// execute, schedule, dispatch, and fetch, then utilization bookkeeping.
    ///
    /// Returns `true` if a mispredict retired this cycle.
    pub fn do_cycle(&mut self, oracle: &mut dyn FetchOracle) -> bool {
        let cycle = self.stats.cycles;
        let _span = tracing::trace_span!("cycle", cycle).entered();

        let mispredict_retired = self.retire_stage(oracle);
        if !mispredict_retired {
            self.execute_stage();
            self.schedule_stage();
            self.dispatch_stage();
            self.fetch_stage(oracle);
        }
        // The i-cache-miss countdown is driven once per simulator cycle by
        // the outer loop, not once per fetch-oracle call, so repeated
        // `next()` calls within one fetch step never double-decrement it.
        oracle.end_of_cycle();

        self.stats.record_utilization(
            self.dispatch_queue.len(),
            self.sched_queue.len(),
            self.rob.len(),
        );
        self.stats.cycles += 1;
        trace!(mispredict_retired, "cycle complete");
        mispredict_retired
    }

    fn retire_stage(&mut self, oracle: &mut dyn FetchOracle) -> bool {
        self.store_buffer
            .pop_front_n(self.stores_retired_prev_cycle);
        self.stores_retired_prev_cycle = 0;

        let mut mispredict_retired = false;
        let mut stores_retired_this_cycle = 0usize;
        let mut retired_any = false;

        while let Some(rob_entry) = self.rob.retire_head() {
            retired_any = true;
            let entry = rob_entry.pipeline_entry;

            if entry.prev_preg >= 32 {
                self.regs.mark_free(entry.prev_preg as usize);
            }
            if entry.inst.opcode == Opcode::Store {
                stores_retired_this_cycle += 1;
            }
            if entry.inst.opcode == Opcode::Load {
                self.stats
                    .record_load_retired(entry.store_buffer_hit, entry.inst.dcache_miss);
            }
            self.stats.instructions_retired += 1;

            if entry.inst.mispredict {
                self.stats.branch_mispredictions += 1;
                oracle.notify_mispredict_retired();
                mispredict_retired = true;
                debug!(dyn_id = entry.dyn_id(), "mispredict retired");
                break;
            }
        }

        self.stores_retired_prev_cycle = stores_retired_this_cycle;

        if retired_any {
            self.cycles_since_retirement = 0;
            self.near_deadlock_warned = false;
        } else {
            self.cycles_since_retirement += 1;
            if !self.near_deadlock_warned
                && self.cycles_since_retirement >= DEADLOCK_THRESHOLD.saturating_sub(16)
            {
                self.near_deadlock_warned = true;
                warn!(
                    cycles_since_retirement = self.cycles_since_retirement,
                    "approaching the deadlock watchdog threshold"
                );
            }
        }

        mispredict_retired
    }

    fn execute_stage(&mut self) {
        for completion in self.alu_bank.advance_all(&mut self.store_buffer) {
            self.complete_entry(completion.entry);
        }
        for completion in self.mul_bank.advance_all(&mut self.store_buffer) {
            self.complete_entry(completion.entry);
        }
        for completion in self.lsu_bank.advance_all(&mut self.store_buffer) {
            self.complete_entry(completion.entry);
        }
    }

    fn complete_entry(&mut self, entry: PipelineEntry) {
        self.sched_queue.remove(entry.dyn_id());
        if entry.dest_preg >= 0 {
            self.regs.mark_ready(entry.dest_preg as usize);
        }
        self.rob
            .mark_completed(entry.dyn_id(), entry.store_buffer_hit);
    }

    fn schedule_stage(&mut self) {
        let snapshot: Vec<PipelineEntry> = self.sched_queue.iter().copied().collect();

        let mut fired_any = false;
        let mut alu_blocked = false;
        let mut mul_blocked = false;
        let mut lsu_blocked = false;

        for (idx, entry) in snapshot.iter().enumerate() {
            if entry.fired {
                continue;
            }
            let class = FuClass::for_opcode(entry.inst.opcode);
            let blocked = match class {
                FuClass::Alu => alu_blocked,
                FuClass::Mul => mul_blocked,
                FuClass::Lsu => lsu_blocked,
            };
            if blocked {
                continue;
            }

            let ready =
                self.regs.is_ready(entry.src1_preg) && self.regs.is_ready(entry.src2_preg);
            if !ready {
                continue;
            }

            if entry.inst.opcode.is_memory_op() && !mem_ok_to_fire(entry.inst.opcode, idx, &snapshot)
            {
                continue;
            }

            let admitted = match class {
                FuClass::Alu => self
                    .alu_bank
                    .find_free_pipe()
                    .inspect(|&i| self.alu_bank.admit(i, *entry)),
                FuClass::Mul => self
                    .mul_bank
                    .find_free_pipe()
                    .inspect(|&i| self.mul_bank.admit(i, *entry)),
                FuClass::Lsu => self
                    .lsu_bank
                    .find_free_pipe()
                    .inspect(|&i| self.lsu_bank.admit(i, *entry)),
            };

            if admitted.is_some() {
                fired_any = true;
                self.sched_queue.set_fired(entry.dyn_id());
            } else {
                match class {
                    FuClass::Alu => alu_blocked = true,
                    FuClass::Mul => mul_blocked = true,
                    FuClass::Lsu => lsu_blocked = true,
                }
            }
        }

        if !fired_any {
            self.stats.no_fire_cycles += 1;
        }
    }

    fn dispatch_stage(&mut self) {
        let mut stall = DispatchStall::None;

        while let Some(inst) = self.dispatch_queue.front().copied() {
            if self.rob.is_full() {
                stall = DispatchStall::RobFull;
                break;
            }

            let free_preg = if inst.dest >= 0 {
                match self.regs.find_free() {
                    Some(idx) => Some(idx),
                    None => {
                        stall = DispatchStall::NoFreePreg;
                        break;
                    }
                }
            } else {
                None
            };

            if self.sched_queue.is_full() {
                break;
            }

            let _ = self.dispatch_queue.pop_front();

            let src1_preg = self.rat.lookup(inst.src1);
            let src2_preg = self.rat.lookup(inst.src2);
            let (dest_preg, prev_preg) = if let Some(idx) = free_preg {
                let prev = self.rat.lookup(inst.dest);
                self.regs.allocate(idx);
                self.rat.remap(inst.dest, idx);
                (idx as i32, prev)
            } else {
                (-1, -1)
            };

            let entry = PipelineEntry::new(inst, src1_preg, src2_preg, dest_preg, prev_preg);
            let _ = self.sched_queue.push(entry);
            let _ = self.rob.push(entry);
        }

        match stall {
            DispatchStall::RobFull => self.stats.rob_stall_cycles += 1,
            DispatchStall::NoFreePreg => self.stats.no_dispatch_pregs_cycles += 1,
            DispatchStall::None => {}
        }
    }

    fn fetch_stage(&mut self, oracle: &mut dyn FetchOracle) {
        for _ in 0..self.config.fetch_width {
            let was_icache_miss = oracle.is_icache_miss_in_flight();
            match oracle.next() {
                Some(inst) => {
                    self.dispatch_queue.push_back(inst);
                    self.stats.instructions_fetched += 1;
                }
                None => {
                    if !was_icache_miss && oracle.is_icache_miss_in_flight() {
                        self.stats.icache_misses += 1;
                    }
                    break;
                }
            }
        }
    }
}

/// Memory disambiguation: a LOAD is blocked by any earlier not-yet-completed
/// STORE; a STORE is blocked by any earlier not-yet-completed LOAD or STORE.
/// Every entry in `snapshot` is, by construction, not yet completed (an
/// entry leaves the scheduling queue the instant it completes).
fn mem_ok_to_fire(opcode: Opcode, idx: usize, snapshot: &[PipelineEntry]) -> bool {
    snapshot[..idx].iter().all(|earlier| {
        !matches!(
            (opcode, earlier.inst.opcode),
            (Opcode::Load, Opcode::Store)
                | (Opcode::Store, Opcode::Load)
                | (Opcode::Store, Opcode::Store)
        )
    })
}
