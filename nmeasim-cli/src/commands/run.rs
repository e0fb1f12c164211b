//! Run command - simulate a scenario and serve its output until the
//! duration elapses or Ctrl+C.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use nmeasim::config::{
    format_duration, DurationValue, ProtocolMode, ScenarioFile, SimulationConfig,
};
use nmeasim::sim::{SimulationStatus, Simulator};

use super::validate::summary;
use crate::error::CliError;
use crate::runner::CliRunner;

/// How often progress is logged while running.
const STATUS_INTERVAL: Duration = Duration::from_secs(10);

/// Arguments for the run command. Flags override the scenario file.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Scenario file (JSON); the built-in San Francisco Bay scenario if omitted
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Output protocol: 0183, 2000 or both
    #[arg(long)]
    pub protocol: Option<String>,

    /// Address the TCP server listens on
    #[arg(long)]
    pub host: Option<String>,

    /// TCP port
    #[arg(long)]
    pub port: Option<u16>,

    /// Stop after this many simulated seconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// Also send datagrams to this address (e.g. 192.168.1.255:10110)
    #[arg(long)]
    pub udp: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;

    let runner = CliRunner::new(config.network.log_level.as_deref(), args.debug)?;
    runner.log_startup("run");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        signal.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    println!("nmeasim v{}", nmeasim::VERSION);
    println!("=============");
    println!();
    print!("{}", summary(&config));
    println!();

    let runtime = runner.runtime()?;
    let status = runtime.block_on(simulate(config, shutdown))?;

    println!();
    print_final_status(&status);
    Ok(())
}

/// Load the scenario and apply command-line overrides before validation.
fn resolve_config(args: &RunArgs) -> Result<SimulationConfig, CliError> {
    let mut scenario = match &args.config {
        Some(path) => ScenarioFile::load_from(path)?,
        None => ScenarioFile::example(),
    };

    if let Some(protocol) = &args.protocol {
        scenario.nmea_version = protocol.parse::<ProtocolMode>()?;
    }
    if let Some(host) = &args.host {
        scenario.network.host = host.clone();
    }
    if let Some(port) = args.port {
        scenario.network.port = port;
    }
    if let Some(seconds) = args.duration {
        scenario.duration_seconds = Some(DurationValue::Seconds(seconds));
    }
    if let Some(udp) = &args.udp {
        scenario.network.udp_target = Some(udp.clone());
    }

    Ok(SimulationConfig::from_scenario(&scenario)?)
}

async fn simulate(
    config: SimulationConfig,
    shutdown: CancellationToken,
) -> Result<SimulationStatus, CliError> {
    let mut simulator = Simulator::from_config(config);
    let addr = simulator.start().await?;

    println!("Serving NMEA on tcp://{}", addr);
    println!("Press Ctrl+C to stop");

    let mut report = tokio::time::interval(STATUS_INTERVAL);
    report.tick().await;
    loop {
        tokio::select! {
            finished = simulator.wait_finished() => {
                finished?;
                info!("Configured duration elapsed");
                break;
            }
            _ = shutdown.cancelled() => {
                info!("Shutdown requested");
                break;
            }
            _ = report.tick() => log_progress(&simulator.status()),
        }
    }

    Ok(simulator.stop().await?)
}

fn log_progress(status: &SimulationStatus) {
    info!(
        ticks = status.ticks,
        elapsed = %format_duration(status.elapsed),
        sentences = status.sentences_emitted,
        consumers = status.consumers,
        lagged_batches = status.lagged_batches,
        overruns = status.overruns,
        "Simulation progress"
    );
}

fn print_final_status(status: &SimulationStatus) {
    println!("Simulation {}", status.state.as_str());
    println!("  Simulated time: {}", format_duration(status.elapsed));
    println!("  Ticks:          {}", status.ticks);
    println!("  Records sent:   {}", status.sentences_emitted);
    if status.encode_errors > 0 {
        println!("  Encode errors:  {}", status.encode_errors);
    }
    if status.overruns > 0 {
        println!("  Tick overruns:  {}", status.overruns);
    }
    if status.lagged_batches > 0 {
        println!("  Dropped (slow consumers): {}", status.lagged_batches);
    }
    if status.udp_errors > 0 {
        println!("  UDP send errors: {}", status.udp_errors);
    }
    if let Some(own) = &status.own_ship {
        println!(
            "  Final position: {:.5}, {:.5}",
            own.position.lat(),
            own.position.lon()
        );
    }
}
