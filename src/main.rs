use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use battleship_mlp::{FleetGenerator, Harness, HarnessConfig, MaskConfig, NetworkShape};
use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};

#[derive(Parser, Debug, Clone)]
#[command(name = "battleship-mlp")]
#[command(version)]
#[command(about = "Train a two-layer network to find ships on random battleship boards")]
struct Args {
    /// Outer training runs.
    #[arg(long, default_value_t = 1001)]
    runs: usize,

    /// Epochs per run; each epoch starts from a fresh network.
    #[arg(long, default_value_t = 1001)]
    epochs: usize,

    /// Training steps per epoch (at least 2).
    #[arg(long, default_value_t = 1001)]
    loops: usize,

    /// Board side length.
    #[arg(long, default_value_t = 8)]
    size: usize,

    /// Hidden layer width (defaults to the board size).
    #[arg(long)]
    hidden: Option<usize>,

    /// Seed for weights, boards and masks. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// A cell is hidden when its uniform draw is above this value.
    #[arg(long, default_value_t = 0.95)]
    hide_threshold: f64,

    /// Mask redraws before giving up on a board.
    #[arg(long, default_value_t = 10_000)]
    max_attempts: usize,

    /// Log a progress line every N epochs.
    #[arg(long, default_value_t = 1)]
    report_every: usize,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Write logs to this file instead of the terminal.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the final report as JSON (requires the `serde` feature).
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let cfg = HarnessConfig {
        runs: args.runs,
        epochs: args.epochs,
        loops: args.loops,
        shape: NetworkShape {
            rows: args.size,
            cols: args.size,
            hidden: args.hidden.unwrap_or(args.size),
        },
        mask: MaskConfig {
            hide_threshold: args.hide_threshold,
            max_attempts: args.max_attempts,
        },
        seed: args.seed,
        report_every: args.report_every,
    };

    let source = FleetGenerator::classic(args.size)?;
    let mut harness = Harness::new(cfg, source)?;
    let report = harness.run()?;

    if let Some(last) = &report.last {
        log::info!("final: {last}");
    }

    if args.json {
        print_json(&report)?;
    }

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    match &args.log_file {
        Some(path) => WriteLogger::init(args.log_level, Config::default(), File::create(path)?)?,
        None => TermLogger::init(
            args.log_level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )?,
    }

    Ok(args)
}

#[cfg(feature = "serde")]
fn print_json(report: &battleship_mlp::HarnessReport) -> Result<(), Box<dyn Error>> {
    println!("{}", report.to_json()?);
    Ok(())
}

#[cfg(not(feature = "serde"))]
fn print_json(_report: &battleship_mlp::HarnessReport) -> Result<(), Box<dyn Error>> {
    Err("`--json` needs the `serde` feature: cargo run --features serde -- --json".into())
}
