//! Scenario document structs.
//!
//! [`ScenarioFile`] mirrors the JSON layout one-to-one. Values are kept in
//! their textual form here; [`super::parser`] turns them into a validated
//! [`super::SimulationConfig`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::nmea2000::N2kFormat;
use crate::route::EndOfRoute;

/// Parsed scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioFile {
    pub network: NetworkSettings,
    pub nmea_version: ProtocolMode,
    /// Talker for every sentence; `GP` when unset.
    pub talker_id: Option<String>,
    pub sentences: SentenceSettings,
    /// PGN numbers to emit; `None` emits every supported PGN.
    pub pgns: Option<Vec<u32>>,
    pub n2k_format: N2kFormat,
    pub n2k_source_address: u8,
    /// Ticks per second.
    pub update_rate: f64,
    /// Simulated run time; `None` runs until stopped.
    pub duration_seconds: Option<DurationValue>,
    /// Simulated UTC at the first tick; `None` uses the wall clock.
    pub start_time: Option<DateTime<Utc>>,
    pub end_of_route: EndOfRoute,
    pub vessel: VesselSettings,
    pub waypoints: Vec<String>,
    pub speed_profile: Vec<SpeedSettings>,
    pub environment: EnvironmentSettings,
    pub ais: AisSettings,
    pub ais_vessels: Vec<AisVesselSettings>,
}

/// Listener and output queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSettings {
    pub host: String,
    pub port: u16,
    /// Optional `host:port` receiving every batch as UDP datagrams.
    pub udp_target: Option<String>,
    /// Batches buffered per consumer before the oldest are dropped.
    pub queue_capacity: usize,
    /// Log filter used when the command line does not override it.
    pub log_level: Option<String>,
}

/// Which protocol families are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolMode {
    #[default]
    #[serde(rename = "0183")]
    Nmea0183,
    #[serde(rename = "2000")]
    Nmea2000,
    #[serde(rename = "both")]
    Both,
}

impl ProtocolMode {
    pub fn emits_0183(&self) -> bool {
        matches!(self, ProtocolMode::Nmea0183 | ProtocolMode::Both)
    }

    pub fn emits_2000(&self) -> bool {
        matches!(self, ProtocolMode::Nmea2000 | ProtocolMode::Both)
    }
}

impl FromStr for ProtocolMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0183" | "nmea0183" => Ok(ProtocolMode::Nmea0183),
            "2000" | "nmea2000" | "n2k" => Ok(ProtocolMode::Nmea2000),
            "both" => Ok(ProtocolMode::Both),
            _ => Err(ConfigError::invalid(
                "nmea_version",
                s,
                "must be one of: 0183, 2000, both",
            )),
        }
    }
}

impl fmt::Display for ProtocolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolMode::Nmea0183 => write!(f, "0183"),
            ProtocolMode::Nmea2000 => write!(f, "2000"),
            ProtocolMode::Both => write!(f, "both"),
        }
    }
}

/// Sentence selection by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentenceSettings {
    /// Only these sentences; `None` means all of them.
    pub include: Option<Vec<String>>,
    pub exclude: Vec<String>,
}

/// A duration written either as seconds or as text such as `"4m"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(f64),
    Text(String),
}

impl DurationValue {
    pub fn text(value: &str) -> Self {
        DurationValue::Text(value.to_string())
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationValue::Seconds(secs) => write!(f, "{}", secs),
            DurationValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Own-ship identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VesselSettings {
    pub mmsi: u64,
    pub name: String,
    pub ship_type: String,
    pub call_sign: Option<String>,
    pub draft: Option<f64>,
    pub destination: Option<String>,
    pub imo: Option<u32>,
}

/// One step of the speed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedSettings {
    /// `None` holds the speed indefinitely; only valid for the last step.
    pub duration: Option<DurationValue>,
    pub speed: f64,
}

/// Wind, depth, variation and GNSS fix quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentSettings {
    /// True wind direction in degrees (from).
    pub wind_direction: f64,
    /// True wind speed in knots.
    pub wind_speed: f64,
    /// Magnetic variation in degrees, east positive.
    pub variation: f64,
    /// Depth below transducer in meters.
    pub depth: f64,
    pub depth_offset: f64,
    pub satellites: u8,
    pub hdop: f64,
}

/// Reporting cadence for AIS traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AisSettings {
    pub report_interval: DurationValue,
    pub static_interval: DurationValue,
}

/// One AIS traffic vessel on a constant course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AisVesselSettings {
    pub mmsi: u64,
    pub name: String,
    pub ship_type: String,
    pub position: String,
    #[serde(default)]
    pub nav_status: Option<String>,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub course: f64,
    #[serde(default)]
    pub draft: Option<f64>,
    #[serde(default)]
    pub call_sign: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}
