//! Von Neumann Stepper - CLI Entry Point
//!
//! Commands:
//! - `vn-stepper trace` - Run the program to halt, printing every micro-step
//! - `vn-stepper explain [step]` - Print step descriptions
//! - `vn-stepper buses` / `registers` - Reference text
//! - `vn-stepper tui` - Interactive visualizer
//! - `vn-stepper test` - Built-in self-test

use clap::{Parser, Subcommand};
use vonneumann::{EngineConfig, StepEngine, Step};
use vonneumann::labels;

#[derive(Parser)]
#[command(name = "vn-stepper")]
#[command(version = "0.1.0")]
#[command(about = "A step-by-step visualizer of the Von Neumann fetch-decode-execute cycle")]
struct Cli {
    /// JSON config file with `transition_ticks` and `tick_ms`
    #[arg(short, long, global = true)]
    config: Option<String>,
    /// Animation ticks each step stays busy for
    #[arg(long, global = true)]
    ticks: Option<u32>,
    /// Milliseconds per animation tick
    #[arg(long, global = true)]
    tick_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the program until it halts, printing each micro-step
    Trace {
        /// Print one JSON snapshot per step instead of text
        #[arg(short, long)]
        json: bool,
        /// Maximum number of micro-steps (default: 1000)
        #[arg(short, long, default_value = "1000")]
        max_steps: u64,
    },
    /// Describe one step, or the whole catalogue
    Explain {
        /// Step identifier, e.g. `fetch-pc-to-mar`
        step: Option<String>,
    },
    /// Describe the address, data and control buses
    Buses,
    /// Describe the registers
    Registers,
    /// Interactive terminal visualizer
    #[cfg(feature = "tui")]
    Tui,
    /// Run the built-in self-test
    Test,
}

fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "tui")]
    let interactive = matches!(cli.command, Some(Commands::Tui));
    #[cfg(not(feature = "tui"))]
    let interactive = false;

    // Log lines would tear the alternate screen unless explicitly asked for.
    if !interactive || std::env::var_os("RUST_LOG").is_some() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = load_config(&cli);

    match cli.command {
        Some(Commands::Trace { json, max_steps }) => {
            trace_program(config, json, max_steps);
        }
        Some(Commands::Explain { step }) => {
            explain(step.as_deref());
        }
        Some(Commands::Buses) => {
            print_buses();
        }
        Some(Commands::Registers) => {
            print_registers();
        }
        #[cfg(feature = "tui")]
        Some(Commands::Tui) => {
            if let Err(e) = vonneumann::run_visualizer(config) {
                eprintln!("❌ Visualizer error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("Von Neumann Stepper v0.1.0");
            println!("The fetch-decode-execute cycle, one micro-step at a time");
            println!();
            println!("Use --help for available commands");
            println!();
            print_program();
        }
    }
}

fn load_config(cli: &Cli) -> EngineConfig {
    let mut config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    if let Some(ticks) = cli.ticks {
        config.transition_ticks = ticks;
    }
    if let Some(ms) = cli.tick_ms {
        config.tick_ms = ms;
    }
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    config
}

fn print_program() {
    let engine = StepEngine::new();
    println!("━━━ Program ━━━");
    for (addr, cell) in engine.memory().dump() {
        println!("  {}: {}", addr, cell);
    }
}

fn trace_program(config: EngineConfig, json: bool, max_steps: u64) {
    let mut engine = StepEngine::with_config(config);

    if !json {
        println!("━━━ Trace ━━━");
    }

    let mut performed = 0u64;
    while !engine.is_halted() && performed < max_steps {
        let step = engine.step();
        engine.advance();
        engine.settle();
        performed += 1;

        if json {
            match serde_json::to_string(&engine.snapshot()) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    eprintln!("❌ Failed to serialize snapshot: {}", e);
                    std::process::exit(1);
                }
            }
            continue;
        }

        let regs = engine.registers();
        println!("{:>3}. {:<8} {}", performed, step.phase(), labels::step_description(step));
        println!(
            "     PC={} MAR={} MDR={} CIR={} ACC={}",
            regs.pc,
            regs.mar_text(),
            regs.mdr_text(),
            regs.cir_text(),
            regs.acc
        );
        if let Some(bus) = engine.bus_event() {
            println!(
                "     {}: {} → {}",
                bus.kind.name(),
                bus.source.endpoint().label(),
                bus.destination.endpoint().label()
            );
        }
        if let Some(fault) = engine.last_fault() {
            println!("     ⚠ {}", fault);
        }
    }

    if json {
        return;
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Steps: {}", performed);
    println!("Halted: {}", engine.is_halted());
    println!("ACC: {}", engine.registers().acc);
    for (addr, cell) in engine.memory().dump() {
        println!("  {}: {}", addr, cell);
    }

    if !engine.is_halted() {
        println!();
        println!("⚠️  Reached max steps limit ({}). Use --max-steps to increase.", max_steps);
    }
}

fn explain(step: Option<&str>) {
    let steps: Vec<Step> = match step {
        Some(id) => match Step::from_id(id) {
            Some(s) => vec![s],
            None => {
                eprintln!("❌ Unknown step: {}", id);
                eprintln!("Known steps:");
                for s in Step::ALL {
                    eprintln!("  {}", s);
                }
                std::process::exit(1);
            }
        },
        None => Step::ALL.to_vec(),
    };

    for s in steps {
        println!("{}", s);
        println!("  {} → {}", labels::describe_phase(s.id()), labels::describe_step(s.id()));
        println!("  {}", labels::explain_step(s.id()));
        println!();
    }
}

fn print_buses() {
    println!("━━━ The three buses in Von Neumann Architecture ━━━");
    for kind in vonneumann::BusKind::ALL {
        println!();
        println!("{}", kind.name());
        println!("  {}", labels::describe_bus(kind));
    }
}

fn print_registers() {
    println!("━━━ The registers in Von Neumann Architecture ━━━");
    for (name, text) in labels::REGISTER_INFO {
        println!();
        println!("{}", name);
        println!("  {}", text);
    }
}

fn run_self_test() {
    println!("━━━ Von Neumann Stepper Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    // Test 1: Fetch phase
    print!("Fetch phase... ");
    let mut engine = StepEngine::with_config(EngineConfig::instant());
    for _ in 0..5 {
        engine.advance();
    }
    let regs = engine.registers();
    if regs.mar == Some(0) && regs.cir.as_deref() == Some("LOAD 5") && regs.pc == 1 {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {:?})", regs);
        failed += 1;
    }

    // Test 2: Whole program
    print!("LOAD/ADD/STORE/HALT... ");
    let mut engine = StepEngine::with_config(EngineConfig::instant());
    engine.run_to_halt(1000);
    let stored = engine.memory().read(7).unwrap_or("?");
    if engine.is_halted() && engine.registers().acc == 15 && stored == "15" {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (acc={}, [7]={})", engine.registers().acc, stored);
        failed += 1;
    }

    // Test 3: Halted engine ignores input
    print!("Advance while halted is a no-op... ");
    let before = engine.snapshot();
    engine.advance();
    if engine.snapshot() == before {
        println!("✓");
        passed += 1;
    } else {
        println!("✗");
        failed += 1;
    }

    // Test 4: Reset
    print!("Reset restores the initial state... ");
    engine.reset();
    if engine.snapshot() == StepEngine::with_config(EngineConfig::instant()).snapshot() {
        println!("✓");
        passed += 1;
    } else {
        println!("✗");
        failed += 1;
    }

    // Test 5: Busy window
    print!("Busy window rejects double clicks... ");
    let mut engine = StepEngine::new();
    engine.advance();
    let rejected = !engine.advance();
    engine.settle();
    if rejected && engine.step() == Step::FetchMarToRam {
        println!("✓");
        passed += 1;
    } else {
        println!("✗");
        failed += 1;
    }

    // Test 6: Labels
    print!("Labels cover the catalogue... ");
    let ok = Step::ALL.iter().all(|s| !labels::explain_step(s.id()).is_empty())
        && labels::explain_step("nope").is_empty();
    if ok { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
