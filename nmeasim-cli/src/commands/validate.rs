//! Validate command - load a scenario and report what it would simulate.

use std::path::Path;

use nmeasim::config::{format_duration, load_config, SimulationConfig};

use crate::error::CliError;

/// Validate the scenario at `path` and print a summary.
pub fn run(path: &Path) -> Result<(), CliError> {
    let config = load_config(path)?;
    println!("{} is valid", path.display());
    println!();
    print!("{}", summary(&config));
    Ok(())
}

/// Human-readable overview of a validated scenario.
pub fn summary(config: &SimulationConfig) -> String {
    let own = &config.own_ship;
    let mut out = String::new();
    out.push_str(&format!(
        "Vessel:      {} (MMSI {})\n",
        own.identity.name, own.identity.mmsi
    ));
    out.push_str(&format!(
        "Route:       {} waypoints, {:.2} nm, end: {:?}\n",
        own.route.len(),
        own.route.total_distance_nm(),
        own.end_of_route
    ));
    out.push_str(&format!("Protocol:    {}\n", config.protocol));
    out.push_str(&format!("Update rate: {} Hz\n", config.update_rate));
    out.push_str(&format!(
        "Duration:    {}\n",
        config
            .duration
            .map(format_duration)
            .unwrap_or_else(|| "unbounded".to_string())
    ));
    out.push_str(&format!("AIS traffic: {} vessels\n", config.ais_vessels.len()));
    out.push_str(&format!(
        "Listen:      {}\n",
        config.network.bind_address()
    ));
    if let Some(target) = config.network.udp_target {
        out.push_str(&format!("UDP target:  {}\n", target));
    }
    out
}
