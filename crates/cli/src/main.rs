//! Command-line driver for the out-of-order processor backend simulator.
//!
//! Loads a trace, builds a [`Core`] sized per the CLI-supplied configuration,
//! and drives it one cycle at a time until the trace drains or the deadlock
//! watchdog fires.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use procsim_core::common::constants::DEADLOCK_THRESHOLD;
use procsim_core::{Config, Core, SimError, TraceFetchOracle};

#[derive(Parser, Debug)]
#[command(
    name = "procsim",
    disable_help_flag = true,
    about = "Cycle-accurate simulator of an out-of-order superscalar processor backend."
)]
struct Cli {
    /// Trace file to simulate.
    #[arg(short = 'I', required = true)]
    trace: PathBuf,

    /// Instructions requested from the fetch oracle per cycle.
    #[arg(short = 'F', default_value_t = 2)]
    fetch_width: usize,

    /// Scheduling-queue slots reserved per functional unit.
    #[arg(short = 'S', default_value_t = 2)]
    sched_slots_per_fu: usize,

    /// Physical registers beyond the 32 architectural ones (ROB = P+32).
    #[arg(short = 'P', default_value_t = 64)]
    pregs: usize,

    /// Number of ALU pipes.
    #[arg(short = 'A', default_value_t = 2)]
    alu_units: usize,

    /// Number of MUL pipes.
    #[arg(short = 'M', default_value_t = 1)]
    mul_units: usize,

    /// Number of LSU pipes.
    #[arg(short = 'L', default_value_t = 2)]
    lsu_units: usize,

    /// Disable mispredict/icache-miss/dcache-miss modeling.
    #[arg(short = 'D')]
    disable_miss_modeling: bool,

    /// Print this help message.
    #[arg(short = 'H', long = "help", action = clap::ArgAction::Help)]
    help: Option<bool>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match Config::new(
        cli.fetch_width,
        cli.sched_slots_per_fu,
        cli.pregs,
        cli.alu_units,
        cli.mul_units,
        cli.lsu_units,
        cli.disable_miss_modeling,
    ) {
        Ok(config) => config,
        Err(err) => return fatal_invalid_config(&err),
    };

    let trace = match procsim_core::trace::load_trace(&cli.trace, config.disable_miss_modeling) {
        Ok(trace) => trace,
        Err(err) => return fatal(&err),
    };

    match run(config, trace) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fatal(&err),
    }
}

fn fatal(err: &SimError) -> ExitCode {
    eprintln!("procsim: {err}");
    ExitCode::FAILURE
}

/// Invalid CLI-supplied configuration also prints usage, since the fix is
/// almost always a corrected flag rather than a corrected trace file.
fn fatal_invalid_config(err: &SimError) -> ExitCode {
    eprintln!("procsim: {err}");
    eprintln!();
    let _ = Cli::command().print_help();
    eprintln!();
    ExitCode::FAILURE
}

fn run(config: Config, trace: Vec<procsim_core::isa::Instruction>) -> Result<(), SimError> {
    let mut core = Core::new(config);
    let mut oracle = TraceFetchOracle::new(trace);

    loop {
        let _ = core.do_cycle(&mut oracle);

        if core.cycles_since_retirement() >= DEADLOCK_THRESHOLD {
            return Err(SimError::Deadlock {
                cycles: core.cycles_since_retirement(),
            });
        }
        if oracle.is_exhausted() && core.is_idle() {
            break;
        }
    }

    print_stats(&core);
    Ok(())
}

fn print_stats(core: &Core) {
    let stats = core.stats();
    let final_stats = stats.finalize();

    println!("cycles: {}", stats.cycles);
    println!("instructions fetched: {}", stats.instructions_fetched);
    println!("instructions retired: {}", stats.instructions_retired);
    println!("branch mispredictions: {}", stats.branch_mispredictions);
    println!("icache misses: {}", stats.icache_misses);
    println!("dcache reads: {}", stats.dcache_reads);
    println!("dcache read misses: {}", stats.dcache_read_misses);
    println!("store buffer read hits: {}", stats.store_buffer_read_hits);
    println!("read AAT: {:.4}", final_stats.read_aat);
    println!("stall cycles (ROB full): {}", stats.rob_stall_cycles);
    println!(
        "stall cycles (no free preg): {}",
        stats.no_dispatch_pregs_cycles
    );
    println!("no-fire cycles: {}", stats.no_fire_cycles);
    println!(
        "dispatch queue size: max {} avg {:.2}",
        stats.dispq_max_size, final_stats.dispq_avg_size
    );
    println!(
        "scheduling queue size: max {} avg {:.2}",
        stats.schedq_max_size, final_stats.schedq_avg_size
    );
    println!(
        "ROB size: max {} avg {:.2}",
        stats.rob_max_size, final_stats.rob_avg_size
    );
    println!("IPC: {:.4}", final_stats.ipc);
}
