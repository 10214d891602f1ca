use procsim_core::isa::{Instruction, Opcode};
use procsim_core::{Config, Core, TraceFetchOracle};

fn inst(dyn_id: u64, opcode: Opcode, dest: i8, src1: i8, src2: i8) -> Instruction {
    Instruction {
        pc: dyn_id * 4,
        opcode,
        dest,
        src1,
        src2,
        addr: 0,
        dyn_id,
        mispredict: false,
        icache_miss: false,
        dcache_miss: false,
    }
}

fn run_to_completion(core: &mut Core, oracle: &mut TraceFetchOracle) -> u64 {
    for _ in 0..10_000 {
        let _ = core.do_cycle(oracle);
        if oracle.is_exhausted() && core.is_idle() {
            return core.stats().cycles;
        }
    }
    panic!("scenario did not drain within the cycle budget");
}

/// Scenario 1: pure RAW chain, three ADDs each depending on the last.
#[test]
fn raw_chain_retires_all_three_in_order_with_ipc_below_one() {
    let config = Config::new(2, 2, 64, 1, 1, 2, false).unwrap();
    let mut core = Core::new(config);
    let mut oracle = TraceFetchOracle::new(vec![
        inst(0, Opcode::Add, 1, -1, -1),
        inst(1, Opcode::Add, 2, 1, -1),
        inst(2, Opcode::Add, 3, 2, -1),
    ]);

    let _ = run_to_completion(&mut core, &mut oracle);
    let stats = core.stats();
    assert_eq!(stats.instructions_retired, 3);
    assert!(stats.finalize().ipc < 1.0);
}

/// Scenario 2: four independent ADDs with two ALU pipes available.
#[test]
fn independent_alu_burst_retires_all_four() {
    let config = Config::new(4, 2, 64, 2, 1, 2, false).unwrap();
    let mut core = Core::new(config);
    let mut oracle = TraceFetchOracle::new(vec![
        inst(0, Opcode::Add, 1, -1, -1),
        inst(1, Opcode::Add, 2, -1, -1),
        inst(2, Opcode::Add, 3, -1, -1),
        inst(3, Opcode::Add, 4, -1, -1),
    ]);

    let _ = run_to_completion(&mut core, &mut oracle);
    assert_eq!(core.stats().instructions_retired, 4);
}

/// Scenario 3: a single MUL occupies a MUL pipe for three stages before
/// completing and retires the cycle after.
#[test]
fn single_mul_retires_after_its_three_stage_latency() {
    let config = Config::new(2, 2, 64, 1, 1, 2, false).unwrap();
    let mut core = Core::new(config);
    let mut oracle = TraceFetchOracle::new(vec![inst(0, Opcode::Mul, 1, -1, -1)]);

    let cycles = run_to_completion(&mut core, &mut oracle);
    assert_eq!(core.stats().instructions_retired, 1);
    // Fetch, dispatch, three execute stages, and retire each cost at least
    // one cycle under the reverse-order stage sequence.
    assert!(cycles >= 5);
}

/// Scenario 4: a lone LOAD with a d-cache miss and no forwarding candidate.
#[test]
fn load_with_dcache_miss_and_no_forward_counts_as_a_read_miss() {
    let config = Config::new(2, 2, 64, 1, 1, 2, false).unwrap();
    let mut core = Core::new(config);
    let mut oracle = TraceFetchOracle::new(vec![Instruction {
        addr: 0x1000,
        dcache_miss: true,
        ..inst(0, Opcode::Load, 1, -1, -1)
    }]);

    let _ = run_to_completion(&mut core, &mut oracle);
    let stats = core.stats();
    assert_eq!(stats.reads, 1);
    assert_eq!(stats.dcache_read_misses, 1);
    assert_eq!(stats.store_buffer_read_hits, 0);
}

/// Scenario 5: a STORE followed by a same-address LOAD forwards instead of
/// going to the d-cache, even though the load is itself flagged as a miss.
#[test]
fn store_then_matching_load_forwards_through_the_store_buffer() {
    let config = Config::new(2, 2, 64, 1, 1, 2, false).unwrap();
    let mut core = Core::new(config);
    let store = Instruction {
        addr: 0x2000,
        ..inst(0, Opcode::Store, -1, 2, 3)
    };
    let load = Instruction {
        addr: 0x2000,
        dcache_miss: true,
        ..inst(1, Opcode::Load, 1, -1, -1)
    };
    let mut oracle = TraceFetchOracle::new(vec![store, load]);

    let _ = run_to_completion(&mut core, &mut oracle);
    let stats = core.stats();
    assert_eq!(stats.store_buffer_read_hits, 1);
    assert_eq!(stats.dcache_reads, 0);
    assert_eq!(stats.dcache_read_misses, 0);
}

/// Scenario 6: the middle of three ADDs mispredicts; the fetch oracle must
/// not deliver the third instruction until the mispredict retires.
#[test]
fn mispredict_suppresses_fetch_of_the_following_instruction_until_retired() {
    let config = Config::new(2, 2, 64, 1, 1, 2, false).unwrap();
    let mut core = Core::new(config);
    let mut oracle = TraceFetchOracle::new(vec![
        inst(0, Opcode::Add, 1, -1, -1),
        Instruction {
            mispredict: true,
            ..inst(1, Opcode::Add, 2, -1, -1)
        },
        inst(2, Opcode::Add, 3, -1, -1),
    ]);

    let _ = run_to_completion(&mut core, &mut oracle);
    let stats = core.stats();
    assert_eq!(stats.branch_mispredictions, 1);
    assert_eq!(stats.instructions_retired, 3);
}

/// Property: `instructions_retired <= instructions_fetched` at every cycle,
/// checked continuously rather than only at the end of the run.
#[test]
fn retired_never_exceeds_fetched_at_any_point_in_the_run() {
    let config = Config::new(4, 4, 64, 2, 1, 2, false).unwrap();
    let mut core = Core::new(config);
    let mut oracle = TraceFetchOracle::new(vec![
        inst(0, Opcode::Add, 1, -1, -1),
        inst(1, Opcode::Mul, 2, 1, -1),
        inst(2, Opcode::Add, 3, -1, -1),
        Instruction {
            addr: 0x3000,
            ..inst(3, Opcode::Store, -1, 1, 2)
        },
        Instruction {
            addr: 0x3000,
            ..inst(4, Opcode::Load, 4, -1, -1)
        },
    ]);

    for _ in 0..10_000 {
        let _ = core.do_cycle(&mut oracle);
        let stats = core.stats();
        assert!(stats.instructions_retired <= stats.instructions_fetched);
        if oracle.is_exhausted() && core.is_idle() {
            break;
        }
    }
    assert_eq!(core.stats().instructions_retired, 5);
}

/// Scenario 7: the first instruction is flagged as an i-cache miss; fetch
/// must stall for the miss penalty before either instruction is dispatched,
/// and both still retire once the stall lifts.
#[test]
fn icache_miss_stalls_fetch_for_exactly_the_miss_penalty() {
    let config = Config::new(2, 2, 64, 1, 1, 2, false).unwrap();
    let mut core = Core::new(config);
    let mut oracle = TraceFetchOracle::new(vec![
        Instruction {
            icache_miss: true,
            ..inst(0, Opcode::Add, 1, -1, -1)
        },
        inst(1, Opcode::Add, 2, -1, -1),
    ]);

    let _ = run_to_completion(&mut core, &mut oracle);
    let stats = core.stats();
    assert_eq!(stats.icache_misses, 1);
    assert_eq!(stats.instructions_retired, 2);
}
