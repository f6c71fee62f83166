//! Treasure Hunt CLI - play a location-based treasure hunt from the terminal.
//!
//! Hunts run against simulated location, proximity, geocoding and compass
//! services; configuration lives in `config.ini` (see `treasurehunt config path`).

mod commands;
mod error;

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use treasurehunt::config::ConfigFile;
use treasurehunt::logging;

use commands::config::ConfigCommands;
use commands::hint::HintArgs;
use commands::play::PlayArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "treasurehunt", version, about = "Location-based treasure hunt")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play a simulated hunt
    #[command(allow_negative_numbers = true)]
    Play {
        /// Starting latitude in degrees
        #[arg(long, default_value_t = 51.5007)]
        lat: f64,

        /// Starting longitude in degrees
        #[arg(long, default_value_t = -0.1246)]
        lon: f64,

        /// Walking speed in meters per second
        #[arg(long, default_value_t = 500.0)]
        speed: f64,

        /// Milliseconds between simulated location fixes
        #[arg(long, default_value_t = 1000)]
        fix_interval_ms: u64,

        /// Hunt duration in seconds (overrides config)
        #[arg(long)]
        duration: Option<u64>,

        /// Seed for reproducible treasure placement
        #[arg(long)]
        seed: Option<u64>,

        /// Print one JSON object per output line
        #[arg(long)]
        json: bool,
    },

    /// Print the directional hint from a position to a target
    #[command(allow_negative_numbers = true)]
    Hint {
        /// Target latitude in degrees
        target_lat: f64,
        /// Target longitude in degrees
        target_lon: f64,
        /// Current latitude in degrees
        current_lat: f64,
        /// Current longitude in degrees
        current_lon: f64,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Play {
            lat,
            lon,
            speed,
            fix_interval_ms,
            duration,
            seed,
            json,
        } => {
            let file = ConfigFile::load()?;

            let mut logging_config = file.logging.clone();
            if cli.verbose {
                logging_config.filter = "treasurehunt=debug".to_string();
            }
            // Held until exit so buffered log lines are flushed
            let _guard = logging::init(&logging_config)?;

            let mut config = file.hunt_config()?;
            if let Some(secs) = duration {
                config = config.with_hunt_duration(Duration::from_secs(secs));
                config.validate()?;
            }

            commands::play::run(
                PlayArgs {
                    start_lat: lat,
                    start_lon: lon,
                    speed,
                    fix_interval: Duration::from_millis(fix_interval_ms),
                    seed,
                    json,
                },
                config,
            )
        }
        Commands::Hint {
            target_lat,
            target_lon,
            current_lat,
            current_lon,
        } => commands::hint::run(HintArgs {
            target_lat,
            target_lon,
            current_lat,
            current_lon,
        }),
        Commands::Config { command } => commands::config::run(command),
    }
}
