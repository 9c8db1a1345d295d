//! Tomasulo simulator CLI.
//!
//! This binary drives the core on built-in demo programs. It performs:
//! 1. **Run:** Execute a demo, print each cycle's log, then dump final state.
//! 2. **List:** Show the available demos.
//!
//! The core takes programs as in-memory instruction lists; the demos below
//! are the canonical dynamic-scheduling exercises.

use clap::{Parser, Subcommand, ValueEnum};
use std::process;

use tomasim_core::common::reg::{fp, reg_name};
use tomasim_core::config::CoreConfig;
use tomasim_core::isa::{Instruction, Opcode};
use tomasim_core::sim::{InitialState, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "tomasim",
    author,
    version,
    about = "Cycle-accurate Tomasulo dynamic-scheduling simulator",
    long_about = "Run a built-in demo program through the out-of-order core and watch \
                  issue, dispatch, broadcast, and commit cycle by cycle.\n\nExamples:\n  \
                  tomasim run\n  tomasim run --demo waw --quiet\n  tomasim run --demo collision --max-cycles 200"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a demo program to completion.
    Run {
        /// Which demo program to execute.
        #[arg(long, value_enum, default_value = "raw-chain")]
        demo: Demo,

        /// Safety cap on simulated cycles.
        #[arg(long, default_value_t = 1000)]
        max_cycles: u64,

        /// Suppress the per-cycle log; print only final state and statistics.
        #[arg(long)]
        quiet: bool,
    },

    /// List the available demo programs.
    List,
}

/// Built-in demo programs.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Demo {
    /// The classic RAW chain: two loads feeding MUL/SUB/DIV/ADD and a store.
    RawChain,
    /// Two writes to one register; renaming keeps the later one.
    Waw,
    /// A taken branch flushing the wrong path.
    Branch,
    /// A store/load address collision enforced by sequence order.
    Collision,
}

impl Demo {
    fn program(self) -> Vec<Instruction> {
        match self {
            Demo::RawChain => vec![
                Instruction::load(Opcode::LdD, fp(6), 2, 0),
                Instruction::load(Opcode::LdD, fp(2), 2, 8),
                Instruction::arith(Opcode::MulD, fp(0), fp(2), fp(4)),
                Instruction::arith(Opcode::SubD, fp(8), fp(2), fp(6)),
                Instruction::arith(Opcode::DivD, fp(10), fp(0), fp(6)),
                Instruction::arith(Opcode::AddD, fp(6), fp(8), fp(2)),
                Instruction::store(Opcode::SdD, fp(6), 2, 8),
            ],
            Demo::Waw => vec![
                Instruction::arith(Opcode::AddD, fp(1), fp(2), fp(3)),
                Instruction::arith(Opcode::AddD, fp(1), fp(2), fp(4)),
            ],
            Demo::Branch => vec![
                Instruction::arith_imm(Opcode::Daddi, 1, 0, 1),
                Instruction::branch(Opcode::Beq, 1, 1, 3),
                Instruction::arith(Opcode::AddD, fp(1), fp(2), fp(3)),
                Instruction::arith(Opcode::AddD, fp(4), fp(2), fp(3)),
            ],
            Demo::Collision => vec![
                Instruction::arith(Opcode::DivD, fp(1), fp(3), fp(4)),
                Instruction::store(Opcode::SdD, fp(1), 2, 0),
                Instruction::load(Opcode::LdD, fp(2), 2, 0),
            ],
        }
    }

    fn name(self) -> &'static str {
        match self {
            Demo::RawChain => "raw-chain",
            Demo::Waw => "waw",
            Demo::Branch => "branch",
            Demo::Collision => "collision",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Demo::RawChain => "two loads feeding MUL/SUB/DIV/ADD and a store (RAW chain)",
            Demo::Waw => "two writes to F1; renaming keeps the later producer",
            Demo::Branch => "a taken BEQ flushes the wrong-path ADD.D",
            Demo::Collision => "a load waits for an earlier store to the same address",
        }
    }
}

/// The register/memory preset shared by all demos: `R2 = 100`, doubles at
/// 100/108/120, and small values in `F1..F4`.
fn demo_initial_state() -> InitialState {
    InitialState::new()
        .with_register(2, 100.0)
        .with_register(fp(1), 10.0)
        .with_register(fp(2), 2.0)
        .with_register(fp(3), 3.0)
        .with_register(fp(4), 4.0)
        .with_memory(100, 1.0)
        .with_memory(108, 2.0)
        .with_memory(120, 3.0)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            demo,
            max_cycles,
            quiet,
        } => cmd_run(demo, max_cycles, quiet),
        Commands::List => {
            println!("Available demos:");
            for demo in [Demo::RawChain, Demo::Waw, Demo::Branch, Demo::Collision] {
                println!("  {:<12} {}", demo.name(), demo.description());
            }
        }
    }
}

/// Builds the simulator for a demo, steps it to completion, and prints the
/// per-cycle log (unless quiet), the final registers, and statistics.
fn cmd_run(demo: Demo, max_cycles: u64, quiet: bool) {
    let program = demo.program();
    println!("[*] Demo: {} ({})", demo.name(), demo.description());
    for (index, instr) in program.iter().enumerate() {
        println!("    {:>3}: {}", index, instr);
    }
    println!();

    let mut sim = match Simulator::new(program, CoreConfig::default()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("[!] Configuration rejected: {}", e);
            process::exit(1);
        }
    };
    sim.apply_initial_state(&demo_initial_state());

    let mut cycles = 0;
    while !sim.is_finished() && cycles < max_cycles {
        let snap = sim.step();
        cycles = snap.cycle;
        if !quiet && !snap.log.is_empty() {
            println!("========== CYCLE {} ==========", snap.cycle);
            for line in &snap.log {
                println!("{}", line);
            }
        }
    }

    if !sim.is_finished() {
        eprintln!("\n[!] Cycle cap {} reached before completion", max_cycles);
        process::exit(1);
    }

    println!("\n[*] Finished in {} cycles", cycles);
    println!("\nFinal registers (non-zero):");
    for (index, reg) in sim.registers().iter().enumerate() {
        if reg.value != 0.0 {
            println!("  {:<4} = {}", reg_name(index), reg.value);
        }
    }

    let (hits, misses, writebacks) = sim.cache_stats();
    println!(
        "\nCache: {} hits, {} misses, {} write-backs",
        hits, misses, writebacks
    );
    sim.stats().print();
}
