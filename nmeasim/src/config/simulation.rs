//! Validated simulation configuration.
//!
//! Produced from a [`super::ScenarioFile`] by [`SimulationConfig::from_scenario`].
//! Every value here has passed its domain checks, so the simulator never
//! needs to re-validate.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::error::ConfigError;
use super::settings::ProtocolMode;
use crate::coord::Coordinate;
use crate::environment::EnvironmentState;
use crate::nmea0183::{SentenceEncoder, SentenceFilter};
use crate::nmea2000::{N2kEncoder, N2kFormat, Pgn};
use crate::route::{EndOfRoute, Route, SpeedProfile};
use crate::vessel::{NavigationStatus, VesselIdentity, VesselModel};

/// Listener and output queue.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    pub udp_target: Option<SocketAddr>,
    pub queue_capacity: usize,
    pub log_level: Option<String>,
}

impl NetworkConfig {
    /// `host:port` string for the TCP listener.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// The simulated own ship.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnShipConfig {
    pub identity: VesselIdentity,
    pub route: Route,
    pub profile: SpeedProfile,
    pub end_of_route: EndOfRoute,
}

/// An AIS traffic vessel holding constant speed and course.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficConfig {
    pub identity: VesselIdentity,
    pub position: Coordinate,
    pub speed_knots: f64,
    pub course: f64,
    pub navigation_status: NavigationStatus,
}

/// AIS reporting cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AisConfig {
    pub report_interval: Duration,
    pub static_interval: Duration,
}

/// Fully validated simulation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub network: NetworkConfig,
    pub protocol: ProtocolMode,
    /// Upper-cased two-letter talker, or `None` for `GP`.
    pub talker_id: Option<String>,
    pub sentences: SentenceFilter,
    /// Enabled PGNs in emission order.
    pub pgns: Vec<Pgn>,
    pub n2k_format: N2kFormat,
    pub n2k_source_address: u8,
    /// Ticks per second.
    pub update_rate: f64,
    pub duration: Option<Duration>,
    pub start_time: Option<DateTime<Utc>>,
    pub own_ship: OwnShipConfig,
    pub environment: EnvironmentState,
    pub ais: AisConfig,
    pub ais_vessels: Vec<TrafficConfig>,
}

impl SimulationConfig {
    /// Simulated time between ticks.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.update_rate)
    }

    /// Ticks needed to cover the configured duration, if any.
    pub fn total_ticks(&self) -> Option<u64> {
        self.duration
            .map(|d| (d.as_secs_f64() * self.update_rate - 1e-9).ceil().max(0.0) as u64)
    }

    /// Sentence encoder honoring the talker override.
    pub fn sentence_encoder(&self) -> Result<SentenceEncoder, ConfigError> {
        match &self.talker_id {
            Some(talker) => SentenceEncoder::with_talker(talker),
            None => Ok(SentenceEncoder::new()),
        }
    }

    pub fn n2k_encoder(&self) -> N2kEncoder {
        N2kEncoder::new(self.n2k_source_address, self.n2k_format)
    }

    /// Kinematic models in configuration order: own ship first, then traffic.
    pub fn build_vessels(&self) -> Result<Vec<VesselModel>, ConfigError> {
        let mut vessels = Vec::with_capacity(1 + self.ais_vessels.len());
        vessels.push(VesselModel::on_route(
            self.own_ship.identity.clone(),
            self.own_ship.route.clone(),
            self.own_ship.profile.clone(),
            self.own_ship.end_of_route,
        ));
        for traffic in &self.ais_vessels {
            vessels.push(VesselModel::dead_reckoning(
                traffic.identity.clone(),
                traffic.position,
                traffic.speed_knots,
                traffic.course,
                traffic.navigation_status,
            )?);
        }
        Ok(vessels)
    }
}
