//! nmeasim CLI - run a vessel simulation and serve its NMEA output.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "nmeasim")]
#[command(version = nmeasim::VERSION)]
#[command(about = "Simulate vessels and stream NMEA 0183, AIS and NMEA 2000 data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and serve its output over TCP (and optionally UDP)
    Run(RunArgs),

    /// Check a scenario file without running it
    Validate {
        /// Scenario file (JSON)
        file: PathBuf,
    },

    /// Print the built-in San Francisco Bay scenario as JSON
    ExampleConfig {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Validate { file } => commands::validate::run(&file),
        Commands::ExampleConfig { output } => commands::example::run(output.as_deref()),
    };

    if let Err(e) = result {
        e.exit();
    }
}
