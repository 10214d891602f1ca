//! Simulation statistics: cycle/IPC counters, cache behavior, stall
//! breakdowns, and structural utilization, finalized per section 4.7.

/// Raw counters accumulated while the simulation runs.
///
/// Every field here is a running total; [`SimStats::finalize`] derives the
/// ratios and averages that need the final cycle count to mean anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Instructions enqueued into the dispatch queue.
    pub instructions_fetched: u64,
    /// Instructions retired.
    pub instructions_retired: u64,
    /// Retired mispredicted branches.
    pub branch_mispredictions: u64,
    /// I-cache-miss stall windows entered (one per oracle false->true
    /// transition, not per stalled cycle).
    pub icache_misses: u64,

    /// Retired loads.
    pub reads: u64,
    /// Retired loads served by store-buffer forwarding.
    pub store_buffer_read_hits: u64,
    /// Retired loads that went to the d-cache (not forwarded).
    pub dcache_reads: u64,
    /// Retired d-cache loads that hit.
    pub dcache_read_hits: u64,
    /// Retired d-cache loads that missed.
    pub dcache_read_misses: u64,

    /// Cycles dispatch stalled solely for lack of a free physical register.
    pub no_dispatch_pregs_cycles: u64,
    /// Cycles dispatch stalled solely because the ROB was full.
    pub rob_stall_cycles: u64,
    /// Cycles in which no scheduling-queue entry fired.
    pub no_fire_cycles: u64,

    /// Largest observed dispatch-queue occupancy.
    pub dispq_max_size: u64,
    /// Sum of end-of-cycle dispatch-queue occupancies (for the average).
    dispq_size_accum: u64,
    /// Largest observed scheduling-queue occupancy.
    pub schedq_max_size: u64,
    /// Sum of end-of-cycle scheduling-queue occupancies.
    schedq_size_accum: u64,
    /// Largest observed ROB occupancy.
    pub rob_max_size: u64,
    /// Sum of end-of-cycle ROB occupancies.
    rob_size_accum: u64,
}

/// Counters derived once the run is over, requiring the final cycle count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalStats {
    /// Average dispatch-queue occupancy across the run.
    pub dispq_avg_size: f64,
    /// Average scheduling-queue occupancy across the run.
    pub schedq_avg_size: f64,
    /// Average ROB occupancy across the run.
    pub rob_avg_size: f64,
    /// `store_buffer_read_hits / reads`.
    pub store_buffer_hit_ratio: f64,
    /// `dcache_read_misses / dcache_reads`.
    pub dcache_read_miss_ratio: f64,
    /// `dcache_reads / reads`.
    pub dcache_ratio: f64,
    /// `L1_HIT_TIME + dcache_read_miss_ratio * L1_MISS_PENALTY`.
    pub dcache_read_aat: f64,
    /// `store_buffer_hit_ratio * 1 + dcache_ratio * dcache_read_aat`.
    pub read_aat: f64,
    /// `instructions_retired / cycles`.
    pub ipc: f64,
}

impl SimStats {
    /// Records the end-of-cycle sizes of the dispatch queue, scheduling
    /// queue, and ROB for max/average tracking.
    pub fn record_utilization(&mut self, dispq_size: usize, schedq_size: usize, rob_size: usize) {
        let dispq_size = dispq_size as u64;
        let schedq_size = schedq_size as u64;
        let rob_size = rob_size as u64;

        self.dispq_max_size = self.dispq_max_size.max(dispq_size);
        self.dispq_size_accum += dispq_size;
        self.schedq_max_size = self.schedq_max_size.max(schedq_size);
        self.schedq_size_accum += schedq_size;
        self.rob_max_size = self.rob_max_size.max(rob_size);
        self.rob_size_accum += rob_size;
    }

    /// Records a retired load's cache/forwarding outcome.
    pub fn record_load_retired(&mut self, store_buffer_hit: bool, dcache_miss: bool) {
        self.reads += 1;
        if store_buffer_hit {
            self.store_buffer_read_hits += 1;
        } else {
            self.dcache_reads += 1;
            if dcache_miss {
                self.dcache_read_misses += 1;
            } else {
                self.dcache_read_hits += 1;
            }
        }
    }

    /// Derives the final ratio/average statistics, guarding every division
    /// against a zero denominator by producing 0.
    #[must_use]
    pub fn finalize(&self) -> FinalStats {
        let cycles = self.cycles as f64;
        let reads = self.reads as f64;
        let dcache_reads = self.dcache_reads as f64;

        let safe_div = |num: f64, den: f64| if den == 0.0 { 0.0 } else { num / den };

        let dispq_avg_size = safe_div(self.dispq_size_accum as f64, cycles);
        let schedq_avg_size = safe_div(self.schedq_size_accum as f64, cycles);
        let rob_avg_size = safe_div(self.rob_size_accum as f64, cycles);

        let store_buffer_hit_ratio = safe_div(self.store_buffer_read_hits as f64, reads);
        let dcache_read_miss_ratio = safe_div(self.dcache_read_misses as f64, dcache_reads);
        let dcache_ratio = safe_div(dcache_reads, reads);

        let dcache_read_aat = f64::from(crate::common::constants::L1_HIT_TIME)
            + dcache_read_miss_ratio * f64::from(crate::common::constants::L1_MISS_PENALTY);
        let read_aat = store_buffer_hit_ratio + dcache_ratio * dcache_read_aat;

        let ipc = safe_div(self.instructions_retired as f64, cycles);

        FinalStats {
            dispq_avg_size,
            schedq_avg_size,
            rob_avg_size,
            store_buffer_hit_ratio,
            dcache_read_miss_ratio,
            dcache_ratio,
            dcache_read_aat,
            read_aat,
            ipc,
        }
    }
}
