//! Default values for every scenario setting.
//!
//! Contains all `DEFAULT_*` constants, the `Default` implementations of the
//! scenario document, and the built-in San Francisco Bay example.

use std::time::Duration;

use super::settings::*;
use crate::environment::{
    GnssFix, DEFAULT_DEPTH_M, DEFAULT_VARIATION, DEFAULT_WIND_DIRECTION, DEFAULT_WIND_SPEED,
};
use crate::nmea2000::{N2kFormat, DEFAULT_SOURCE_ADDRESS};
use crate::route::EndOfRoute;

// =============================================================================
// Network
// =============================================================================

/// Listener host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Conventional NMEA-over-TCP port.
pub const DEFAULT_PORT: u16 = 10110;

/// Batches buffered per consumer before the oldest are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

// =============================================================================
// Simulation
// =============================================================================

/// Ticks per second.
pub const DEFAULT_UPDATE_RATE: f64 = 1.0;

/// Highest accepted tick rate.
pub const MAX_UPDATE_RATE: f64 = 100.0;

// =============================================================================
// Own ship
// =============================================================================

pub const DEFAULT_MMSI: u64 = 366_999_999;
pub const DEFAULT_VESSEL_NAME: &str = "SIM VESSEL";
pub const DEFAULT_SHIP_TYPE: &str = "sailing";

// =============================================================================
// AIS
// =============================================================================

/// Interval between position reports of each traffic vessel.
pub const DEFAULT_AIS_REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Interval between static and voyage reports of each traffic vessel.
pub const DEFAULT_AIS_STATIC_INTERVAL: Duration = Duration::from_secs(360);

// =============================================================================
// Default implementations
// =============================================================================

impl Default for ScenarioFile {
    fn default() -> Self {
        Self {
            network: NetworkSettings::default(),
            nmea_version: ProtocolMode::default(),
            talker_id: None,
            sentences: SentenceSettings::default(),
            pgns: None,
            n2k_format: N2kFormat::default(),
            n2k_source_address: DEFAULT_SOURCE_ADDRESS,
            update_rate: DEFAULT_UPDATE_RATE,
            duration_seconds: None,
            start_time: None,
            end_of_route: EndOfRoute::default(),
            vessel: VesselSettings::default(),
            waypoints: Vec::new(),
            speed_profile: Vec::new(),
            environment: EnvironmentSettings::default(),
            ais: AisSettings::default(),
            ais_vessels: Vec::new(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            udp_target: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            log_level: None,
        }
    }
}

impl Default for VesselSettings {
    fn default() -> Self {
        Self {
            mmsi: DEFAULT_MMSI,
            name: DEFAULT_VESSEL_NAME.to_string(),
            ship_type: DEFAULT_SHIP_TYPE.to_string(),
            call_sign: None,
            draft: None,
            destination: None,
            imo: None,
        }
    }
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        let gnss = GnssFix::default();
        Self {
            wind_direction: DEFAULT_WIND_DIRECTION,
            wind_speed: DEFAULT_WIND_SPEED,
            variation: DEFAULT_VARIATION,
            depth: DEFAULT_DEPTH_M,
            depth_offset: 0.0,
            satellites: gnss.satellites,
            hdop: gnss.hdop,
        }
    }
}

impl Default for AisSettings {
    fn default() -> Self {
        Self {
            report_interval: DurationValue::Seconds(DEFAULT_AIS_REPORT_INTERVAL.as_secs_f64()),
            static_interval: DurationValue::Seconds(DEFAULT_AIS_STATIC_INTERVAL.as_secs_f64()),
        }
    }
}

// =============================================================================
// Example scenario
// =============================================================================

impl ScenarioFile {
    /// A short route across San Francisco Bay with a stall in the speed
    /// profile and a handful of AIS traffic vessels in varied states.
    pub fn example() -> Self {
        let waypoints = [
            "37° 40.3574' N, 122° 22.1457' W",
            "37° 43.4444' N, 122° 20.7058' W",
            "37° 48.0941' N, 122° 22.7372' W",
            "37° 49.1258' N, 122° 25.2814' W",
        ];
        let speed_profile = vec![
            SpeedSettings {
                duration: Some(DurationValue::text("1m")),
                speed: 8.0,
            },
            SpeedSettings {
                duration: Some(DurationValue::text("4m")),
                speed: 0.1,
            },
            SpeedSettings {
                duration: Some(DurationValue::text("15m")),
                speed: 10.0,
            },
            SpeedSettings {
                duration: None,
                speed: 8.0,
            },
        ];

        let traffic = |mmsi: u64,
                       name: &str,
                       ship_type: &str,
                       position: &str,
                       nav_status: &str,
                       speed: f64,
                       course: f64| AisVesselSettings {
            mmsi,
            name: name.to_string(),
            ship_type: ship_type.to_string(),
            position: position.to_string(),
            nav_status: Some(nav_status.to_string()),
            speed,
            course,
            draft: None,
            call_sign: None,
            destination: None,
        };

        let mut deep_draft = traffic(
            366_123_460,
            "DEEP DRAFT",
            "tanker",
            "37° 40.7575' N, 122° 22.5460' W",
            "constrained_draft",
            15.0,
            0.0,
        );
        deep_draft.draft = Some(15.5);

        let ais_vessels = vec![
            traffic(
                366_123_456,
                "BAY TRADER",
                "cargo",
                "37° 40.3575' N, 122° 22.1460' W",
                "underway_engine",
                12.0,
                50.0,
            ),
            traffic(
                366_123_457,
                "ANCHOR QUEEN",
                "tanker",
                "37° 40.4575' N, 122° 22.2460' W",
                "at_anchor",
                0.0,
                0.0,
            ),
            traffic(
                366_123_458,
                "DISABLED LADY",
                "cargo",
                "37° 40.5575' N, 122° 22.3460' W",
                "not_under_command",
                0.1,
                0.0,
            ),
            traffic(
                366_123_459,
                "DREDGER ONE",
                "dredger",
                "37° 40.6575' N, 122° 22.4460' W",
                "restricted_maneuver",
                3.0,
                0.0,
            ),
            deep_draft,
            traffic(
                366_123_461,
                "PIER SIDE",
                "cargo",
                "37° 40.8575' N, 122° 22.6460' W",
                "moored",
                0.0,
                0.0,
            ),
            traffic(
                366_123_462,
                "ON THE ROCKS",
                "cargo",
                "37° 40.9575' N, 122° 22.7460' W",
                "aground",
                0.0,
                0.0,
            ),
            traffic(
                366_123_463,
                "FISHING MASTER",
                "fishing",
                "37° 41.0575' N, 122° 22.8460' W",
                "fishing",
                8.0,
                80.0,
            ),
            traffic(
                366_123_464,
                "WIND WALKER",
                "sailing",
                "37° 40.3775' N, 122° 22.1460' W",
                "underway_sailing",
                6.0,
                0.0,
            ),
        ];

        Self {
            waypoints: waypoints.iter().map(|w| w.to_string()).collect(),
            speed_profile,
            ais_vessels,
            ..Self::default()
        }
    }
}
