//! parking-sim - parking facility simulator
//!
//! Module structure:
//! - `domain/` - Core value types (Vehicle, Location, ParkingSession, errors)
//! - `services/` - Policies and the ParkingLot orchestrator
//! - `io/` - Simulation script input
//! - `infra/` - Infrastructure (Config, Metrics)

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use parking_sim::domain::types::Location;
use parking_sim::infra::Config;
use parking_sim::io::{load_script, ScriptRunner};
use parking_sim::services::{ManualClock, SystemClock};
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Parking facility simulator
#[derive(Parser, Debug)]
#[command(name = "parking-sim", version, about)]
struct Args {
    /// Path to TOML configuration file (falls back to CONFIG_FILE, then config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the occupancy of the configured lot
    Show,
    /// Print the vehicle variants a slot admits
    Allowed { floor: u32, slot: u32 },
    /// Print the tariff for a parked duration
    Quote { minutes: i64 },
    /// Replay a JSON script against the configured lot
    Simulate {
        script: String,
        /// Simulation start time, e.g. 2022-05-15T13:00:00 (default: now)
        #[arg(long)]
        start: Option<NaiveDateTime>,
    },
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug shows every lot transition
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config_path = Config::resolve_config_path(args.config);
    let config = Config::load_from_path(&config_path);

    info!(
        config_file = %config.config_file(),
        lot = %config.lot_name(),
        floors = %config.floors(),
        slots_per_floor = %config.slots_per_floor(),
        fee = %config.fee(),
        block_minutes = %config.block_minutes(),
        billing = %config.billing().as_str(),
        seeds = %config.seeds().len(),
        "config_loaded"
    );

    match args.command {
        Command::Show => {
            let lot = config.build_lot(SystemClock)?;
            print!("{}", lot.show());
        }
        Command::Allowed { floor, slot } => {
            let lot = config.build_lot(SystemClock)?;
            let location = Location::new(floor, slot);
            println!("{location}: {}", lot.allowed_variants(location));
        }
        Command::Quote { minutes } => {
            let lot = config.build_lot(SystemClock)?;
            let cost = lot.cost_policy().cost(minutes).context("Cannot quote")?;
            println!("{minutes} min: {cost}");
        }
        Command::Simulate { script, start } => {
            let steps = load_script(&script)?;
            let clock = ManualClock::new(start.unwrap_or_else(|| Local::now().naive_local()));
            let lot = config.build_lot(clock.clone())?;
            let mut runner = ScriptRunner::new(lot, clock);

            let outcomes = runner.run(&steps);
            let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(message) => println!("#{:<3} {:<9} ok   {}", outcome.index, outcome.step, message.trim_end()),
                    Err(e) => println!("#{:<3} {:<9} FAIL {}", outcome.index, outcome.step, e),
                }
            }

            runner.lot().report().log();
            info!(steps = %outcomes.len(), failed = %failed, "simulation_complete");
        }
    }

    Ok(())
}
