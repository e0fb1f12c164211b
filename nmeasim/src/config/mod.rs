//! Scenario configuration.
//!
//! A scenario is a JSON document ([`ScenarioFile`]) that is validated once at
//! startup into a [`SimulationConfig`]. Validation is strict: any value
//! outside its domain is a [`ConfigError`] naming the field, never a silent
//! default.
//!
//! # Example
//!
//! ```
//! use nmeasim::config::{ScenarioFile, SimulationConfig};
//!
//! let scenario = ScenarioFile::from_json(r#"{
//!     "waypoints": ["37° 40.3574' N, 122° 22.1457' W", "37.75,-122.35"],
//!     "speed_profile": [{"duration": "1m", "speed": 8.0}, {"duration": null, "speed": 6.0}]
//! }"#).unwrap();
//!
//! let config = SimulationConfig::from_scenario(&scenario).unwrap();
//! assert_eq!(config.own_ship.route.len(), 2);
//! ```

mod defaults;
mod duration;
mod error;
mod file;
mod parser;
mod settings;
mod simulation;

use std::path::Path;

pub use defaults::*;
pub use duration::{format_duration, parse_duration, DurationParseError};
pub use error::ConfigError;
pub use settings::{
    AisSettings, AisVesselSettings, DurationValue, EnvironmentSettings, NetworkSettings,
    ProtocolMode, ScenarioFile, SentenceSettings, SpeedSettings, VesselSettings,
};
pub use simulation::{AisConfig, NetworkConfig, OwnShipConfig, SimulationConfig, TrafficConfig};

/// Load and validate the scenario at `path`.
pub fn load_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let scenario = ScenarioFile::load_from(path)?;
    let config = SimulationConfig::from_scenario(&scenario)?;
    tracing::debug!(
        path = %path.display(),
        waypoints = config.own_ship.route.len(),
        ais_vessels = config.ais_vessels.len(),
        "Loaded scenario"
    );
    Ok(config)
}
