//! Validation of a [`ScenarioFile`] into a [`SimulationConfig`].
//!
//! This is the single place where document fields are checked against
//! their domain rules. Errors name the offending field with its path in the
//! document, e.g. `ais_vessels[2].position`.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use super::defaults::MAX_UPDATE_RATE;
use super::duration::parse_duration;
use super::error::ConfigError;
use super::settings::*;
use super::simulation::*;
use crate::coord::parse_position;
use crate::environment::{EnvironmentState, GnssFix};
use crate::nmea0183::{SentenceEncoder, SentenceFilter};
use crate::nmea2000::Pgn;
use crate::route::{Route, SpeedProfile, SpeedSegment};
use crate::vessel::{Mmsi, NavigationStatus, ShipType, VesselIdentity};

/// Log filters accepted in `network.log_level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Upper bound on the broadcast queue.
const MAX_QUEUE_CAPACITY: usize = 1 << 20;

impl SimulationConfig {
    /// Validate every field of `scenario`.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found; nothing is silently defaulted.
    pub fn from_scenario(scenario: &ScenarioFile) -> Result<Self, ConfigError> {
        let network = parse_network(&scenario.network)?;

        let talker_id = match &scenario.talker_id {
            Some(talker) => {
                let encoder = SentenceEncoder::with_talker(talker)?;
                Some(encoder.talker().to_string())
            }
            None => None,
        };

        let sentences = SentenceFilter::new(
            scenario.sentences.include.as_deref(),
            scenario.sentences.exclude.as_slice(),
        )?;

        let pgns = parse_pgns(scenario.pgns.as_deref())?;

        if !scenario.update_rate.is_finite()
            || scenario.update_rate <= 0.0
            || scenario.update_rate > MAX_UPDATE_RATE
        {
            return Err(ConfigError::invalid(
                "update_rate",
                scenario.update_rate,
                format!("must be greater than 0 and at most {}", MAX_UPDATE_RATE),
            ));
        }

        let duration = scenario
            .duration_seconds
            .as_ref()
            .map(|value| positive_duration("duration_seconds", value))
            .transpose()?;

        let identity = parse_identity("vessel", &scenario.vessel)?;
        let route = parse_route(&scenario.waypoints)?;
        let profile = parse_profile(&scenario.speed_profile)?;

        let environment = parse_environment(&scenario.environment)?;

        let ais = AisConfig {
            report_interval: positive_duration(
                "ais.report_interval",
                &scenario.ais.report_interval,
            )?,
            static_interval: positive_duration(
                "ais.static_interval",
                &scenario.ais.static_interval,
            )?,
        };

        let mut seen = HashSet::from([identity.mmsi]);
        let mut ais_vessels = Vec::with_capacity(scenario.ais_vessels.len());
        for (index, raw) in scenario.ais_vessels.iter().enumerate() {
            let traffic = parse_traffic(index, raw)?;
            if !seen.insert(traffic.identity.mmsi) {
                return Err(ConfigError::DuplicateMmsi(traffic.identity.mmsi.value()));
            }
            ais_vessels.push(traffic);
        }

        Ok(SimulationConfig {
            network,
            protocol: scenario.nmea_version,
            talker_id,
            sentences,
            pgns,
            n2k_format: scenario.n2k_format,
            n2k_source_address: scenario.n2k_source_address,
            update_rate: scenario.update_rate,
            duration,
            start_time: scenario.start_time,
            own_ship: OwnShipConfig {
                identity,
                route,
                profile,
                end_of_route: scenario.end_of_route,
            },
            environment,
            ais,
            ais_vessels,
        })
    }
}

fn parse_network(raw: &NetworkSettings) -> Result<NetworkConfig, ConfigError> {
    let host = raw.host.trim();
    if host.is_empty() {
        return Err(ConfigError::invalid(
            "network.host",
            &raw.host,
            "must not be empty",
        ));
    }

    let udp_target = match raw.udp_target.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(target) => Some(target.parse::<SocketAddr>().map_err(|_| {
            ConfigError::invalid(
                "network.udp_target",
                target,
                "expected an address like '192.168.1.255:10110'",
            )
        })?),
    };

    if raw.queue_capacity == 0 || raw.queue_capacity > MAX_QUEUE_CAPACITY {
        return Err(ConfigError::invalid(
            "network.queue_capacity",
            raw.queue_capacity,
            format!("must be between 1 and {}", MAX_QUEUE_CAPACITY),
        ));
    }

    let log_level = match &raw.log_level {
        Some(level) => {
            let level = level.trim().to_ascii_lowercase();
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::invalid(
                    "network.log_level",
                    level,
                    "must be one of: trace, debug, info, warn, error",
                ));
            }
            Some(level)
        }
        None => None,
    };

    Ok(NetworkConfig {
        host: host.to_string(),
        port: raw.port,
        udp_target,
        queue_capacity: raw.queue_capacity,
        log_level,
    })
}

/// Enabled PGNs in catalog order. `None` enables all of them.
fn parse_pgns(numbers: Option<&[u32]>) -> Result<Vec<Pgn>, ConfigError> {
    let Some(numbers) = numbers else {
        return Ok(Pgn::ALL.to_vec());
    };
    let wanted = numbers
        .iter()
        .map(|&n| Pgn::try_from(n))
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(Pgn::ALL
        .into_iter()
        .filter(|pgn| wanted.contains(pgn))
        .collect())
}

fn parse_route(waypoints: &[String]) -> Result<Route, ConfigError> {
    let waypoints = waypoints
        .iter()
        .enumerate()
        .map(|(index, text)| {
            parse_position(text).map_err(|source| ConfigError::Coordinate {
                field: format!("waypoints[{}]", index),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Route::new(waypoints)
}

fn parse_profile(steps: &[SpeedSettings]) -> Result<SpeedProfile, ConfigError> {
    let segments = steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            Ok(match &step.duration {
                Some(value) => {
                    let field = format!("speed_profile[{}].duration", index);
                    SpeedSegment::timed(duration_value(&field, value)?, step.speed)
                }
                None => SpeedSegment::indefinite(step.speed),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;
    SpeedProfile::new(segments)
}

fn parse_environment(raw: &EnvironmentSettings) -> Result<EnvironmentState, ConfigError> {
    EnvironmentState {
        wind_direction: raw.wind_direction,
        wind_speed_knots: raw.wind_speed,
        magnetic_variation: raw.variation,
        water_depth_m: raw.depth,
        depth_offset_m: raw.depth_offset,
        gnss: GnssFix {
            satellites: raw.satellites,
            hdop: raw.hdop,
            ..GnssFix::default()
        },
    }
    .validated()
}

fn parse_identity(prefix: &str, raw: &VesselSettings) -> Result<VesselIdentity, ConfigError> {
    let mmsi = Mmsi::new(raw.mmsi)?;
    let ship_type = ship_type(prefix, &raw.ship_type)?;
    let mut identity =
        VesselIdentity::new(mmsi, &raw.name, ship_type).map_err(|e| within(prefix, e))?;
    if let Some(call_sign) = &raw.call_sign {
        identity = identity
            .with_call_sign(call_sign)
            .map_err(|e| within(prefix, e))?;
    }
    if let Some(draft) = raw.draft {
        identity = identity.with_draft(draft).map_err(|e| within(prefix, e))?;
    }
    if let Some(destination) = &raw.destination {
        identity = identity.with_destination(destination);
    }
    if let Some(imo) = raw.imo {
        identity = identity.with_imo(imo);
    }
    Ok(identity)
}

fn parse_traffic(index: usize, raw: &AisVesselSettings) -> Result<TrafficConfig, ConfigError> {
    let prefix = format!("ais_vessels[{}]", index);

    let identity = parse_identity(
        &prefix,
        &VesselSettings {
            mmsi: raw.mmsi,
            name: raw.name.clone(),
            ship_type: raw.ship_type.clone(),
            call_sign: raw.call_sign.clone(),
            draft: raw.draft,
            destination: raw.destination.clone(),
            imo: None,
        },
    )?;

    let position = parse_position(&raw.position).map_err(|source| ConfigError::Coordinate {
        field: format!("{}.position", prefix),
        source,
    })?;

    if !raw.speed.is_finite() || raw.speed < 0.0 {
        return Err(ConfigError::invalid(
            format!("{}.speed", prefix),
            raw.speed,
            "must be a non-negative number",
        ));
    }
    if !raw.course.is_finite() {
        return Err(ConfigError::invalid(
            format!("{}.course", prefix),
            raw.course,
            "must be a number",
        ));
    }

    let navigation_status = match &raw.nav_status {
        Some(name) => NavigationStatus::from_name(name).ok_or_else(|| {
            ConfigError::invalid(
                format!("{}.nav_status", prefix),
                name,
                "unknown navigation status",
            )
        })?,
        None => NavigationStatus::for_speed(
            NavigationStatus::default(),
            raw.speed,
            identity.ship_type,
        ),
    };

    Ok(TrafficConfig {
        identity,
        position,
        speed_knots: raw.speed,
        course: crate::coord::normalize_degrees(raw.course),
        navigation_status,
    })
}

fn ship_type(prefix: &str, name: &str) -> Result<ShipType, ConfigError> {
    if let Some(ship_type) = ShipType::from_name(name) {
        return Ok(ship_type);
    }
    // Numeric AIS type codes are accepted too
    match name.trim().parse::<u8>() {
        Ok(code) if code < 100 => Ok(ShipType::from_code(code)),
        _ => Err(ConfigError::invalid(
            format!("{}.ship_type", prefix),
            name,
            "expected a ship type name such as 'cargo' or an AIS type code below 100",
        )),
    }
}

/// A duration given as seconds or as text.
fn duration_value(field: &str, value: &DurationValue) -> Result<Duration, ConfigError> {
    match value {
        DurationValue::Seconds(secs) => {
            if !secs.is_finite() || *secs < 0.0 || *secs > u32::MAX as f64 {
                return Err(ConfigError::invalid(
                    field,
                    secs,
                    "must be a non-negative number of seconds",
                ));
            }
            Ok(Duration::from_secs_f64(*secs))
        }
        DurationValue::Text(text) => parse_duration(text).map_err(|source| ConfigError::Duration {
            field: field.to_string(),
            source,
        }),
    }
}

fn positive_duration(field: &str, value: &DurationValue) -> Result<Duration, ConfigError> {
    let duration = duration_value(field, value)?;
    if duration.is_zero() {
        return Err(ConfigError::invalid(field, value, "must be greater than zero"));
    }
    Ok(duration)
}

/// Prefix the field name of a value error with its position in the document.
fn within(prefix: &str, err: ConfigError) -> ConfigError {
    match err {
        ConfigError::InvalidValue {
            field,
            value,
            reason,
        } => ConfigError::InvalidValue {
            field: format!("{}.{}", prefix, field),
            value,
            reason,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea0183::SentenceKind;
    use crate::config::ProtocolMode;
    use crate::route::EndOfRoute;

    fn minimal() -> ScenarioFile {
        ScenarioFile {
            waypoints: vec!["37.7,-122.3".to_string(), "37.8,-122.3".to_string()],
            speed_profile: vec![SpeedSettings {
                duration: None,
                speed: 6.0,
            }],
            ..ScenarioFile::default()
        }
    }

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::InvalidValue { field, .. } => field,
            ConfigError::Coordinate { field, .. } => field,
            ConfigError::Duration { field, .. } => field,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_example_scenario_is_valid() {
        let config = SimulationConfig::from_scenario(&ScenarioFile::example()).unwrap();

        assert_eq!(config.own_ship.route.len(), 4);
        assert_eq!(config.own_ship.profile.segments().len(), 4);
        assert_eq!(config.own_ship.end_of_route, EndOfRoute::Hold);
        assert_eq!(config.ais_vessels.len(), 9);
        assert_eq!(config.network.port, 10110);
        assert_eq!(config.protocol, ProtocolMode::Nmea0183);
        assert_eq!(config.pgns.len(), Pgn::ALL.len());
        assert_eq!(config.ais.report_interval, Duration::from_secs(10));
        assert_eq!(config.ais.static_interval, Duration::from_secs(360));
        assert_eq!(config.duration, None);

        let deep = &config.ais_vessels[4];
        assert_eq!(deep.identity.name, "DEEP DRAFT");
        assert_eq!(deep.identity.draft_m, Some(15.5));
        assert_eq!(
            deep.navigation_status,
            NavigationStatus::ConstrainedByDraught
        );
    }

    #[test]
    fn test_example_builds_vessels() {
        let config = SimulationConfig::from_scenario(&ScenarioFile::example()).unwrap();
        let vessels = config.build_vessels().unwrap();
        assert_eq!(vessels.len(), 10);
        assert_eq!(vessels[0].identity().mmsi.value(), 366_999_999);
        assert!(vessels[0].tracker().is_some());
        assert!(vessels[1].tracker().is_none());
    }

    #[test]
    fn test_tick_math() {
        let mut scenario = minimal();
        scenario.update_rate = 2.0;
        scenario.duration_seconds = Some(DurationValue::text("1m"));
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        assert_eq!(config.tick_period(), Duration::from_millis(500));
        assert_eq!(config.total_ticks(), Some(120));
    }

    #[test]
    fn test_bad_waypoint_names_index() {
        let mut scenario = minimal();
        scenario.waypoints[1] = "91° 00.0' N, 122° W".to_string();
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "waypoints[1]");
    }

    #[test]
    fn test_empty_route_rejected() {
        let mut scenario = minimal();
        scenario.waypoints.clear();
        assert!(matches!(
            SimulationConfig::from_scenario(&scenario),
            Err(ConfigError::EmptyRoute)
        ));
    }

    #[test]
    fn test_indefinite_segment_must_be_last() {
        let mut scenario = minimal();
        scenario.speed_profile.push(SpeedSettings {
            duration: Some(DurationValue::text("1m")),
            speed: 3.0,
        });
        assert!(matches!(
            SimulationConfig::from_scenario(&scenario),
            Err(ConfigError::IndefiniteSegmentNotLast { index: 0 })
        ));
    }

    #[test]
    fn test_bad_duration_text() {
        let mut scenario = minimal();
        scenario.speed_profile.insert(
            0,
            SpeedSettings {
                duration: Some(DurationValue::text("4 fortnights")),
                speed: 3.0,
            },
        );
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "speed_profile[0].duration");
    }

    #[test]
    fn test_update_rate_bounds() {
        for rate in [0.0, -1.0, f64::NAN, 1000.0] {
            let mut scenario = minimal();
            scenario.update_rate = rate;
            let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
            assert_eq!(field_of(err), "update_rate");
        }
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let mut scenario = minimal();
        scenario.network.queue_capacity = 0;
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "network.queue_capacity");
    }

    #[test]
    fn test_udp_target_parsed() {
        let mut scenario = minimal();
        scenario.network.udp_target = Some("127.0.0.1:10111".to_string());
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        assert_eq!(
            config.network.udp_target,
            Some("127.0.0.1:10111".parse().unwrap())
        );

        scenario.network.udp_target = Some("not an address".to_string());
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "network.udp_target");
    }

    #[test]
    fn test_unknown_sentence_rejected() {
        let mut scenario = minimal();
        scenario.sentences.exclude = vec!["XYZ".to_string()];
        assert!(matches!(
            SimulationConfig::from_scenario(&scenario),
            Err(ConfigError::UnknownSentence(name)) if name == "XYZ"
        ));
    }

    #[test]
    fn test_sentence_filter_applied() {
        let mut scenario = minimal();
        scenario.sentences.include = Some(vec!["rmc".to_string(), "GGA".to_string()]);
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        assert_eq!(
            config.sentences.enabled(),
            &[SentenceKind::Rmc, SentenceKind::Gga]
        );
    }

    #[test]
    fn test_pgn_selection_keeps_catalog_order() {
        let mut scenario = minimal();
        scenario.pgns = Some(vec![130306, 126992, 130306]);
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        assert_eq!(config.pgns, vec![Pgn::SystemTime, Pgn::WindData]);

        scenario.pgns = Some(vec![127251]);
        assert!(matches!(
            SimulationConfig::from_scenario(&scenario),
            Err(ConfigError::UnsupportedPgn(127251))
        ));
    }

    #[test]
    fn test_talker_normalized() {
        let mut scenario = minimal();
        scenario.talker_id = Some("ii".to_string());
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        assert_eq!(config.talker_id.as_deref(), Some("II"));

        scenario.talker_id = Some("GPS".to_string());
        assert!(SimulationConfig::from_scenario(&scenario).is_err());
    }

    #[test]
    fn test_invalid_mmsi() {
        let mut scenario = minimal();
        scenario.vessel.mmsi = 12345;
        assert!(matches!(
            SimulationConfig::from_scenario(&scenario),
            Err(ConfigError::InvalidMmsi(12345))
        ));
    }

    #[test]
    fn test_duplicate_mmsi_rejected() {
        let mut scenario = ScenarioFile::example();
        scenario.ais_vessels[3].mmsi = scenario.vessel.mmsi;
        assert!(matches!(
            SimulationConfig::from_scenario(&scenario),
            Err(ConfigError::DuplicateMmsi(366_999_999))
        ));
    }

    #[test]
    fn test_traffic_errors_name_vessel() {
        let mut scenario = ScenarioFile::example();
        scenario.ais_vessels[2].nav_status = Some("drifting".to_string());
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "ais_vessels[2].nav_status");

        let mut scenario = ScenarioFile::example();
        scenario.ais_vessels[0].name = "A NAME THAT IS FAR TOO LONG".to_string();
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "ais_vessels[0].name");

        let mut scenario = ScenarioFile::example();
        scenario.ais_vessels[1].speed = -2.0;
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "ais_vessels[1].speed");
    }

    #[test]
    fn test_traffic_status_defaults_from_speed() {
        let mut scenario = minimal();
        scenario.ais_vessels = vec![AisVesselSettings {
            mmsi: 366_000_001,
            name: "DRIFTER".to_string(),
            ship_type: "cargo".to_string(),
            position: "37.75,-122.35".to_string(),
            nav_status: None,
            speed: 0.0,
            course: 370.0,
            draft: None,
            call_sign: None,
            destination: None,
        }];
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        assert_eq!(
            config.ais_vessels[0].navigation_status,
            NavigationStatus::AtAnchor
        );
        assert_eq!(config.ais_vessels[0].course, 10.0);
    }

    #[test]
    fn test_numeric_ship_type() {
        let mut scenario = minimal();
        scenario.vessel.ship_type = "37".to_string();
        let config = SimulationConfig::from_scenario(&scenario).unwrap();
        assert_eq!(config.own_ship.identity.ship_type.code(), 37);

        scenario.vessel.ship_type = "submarine".to_string();
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "vessel.ship_type");
    }

    #[test]
    fn test_environment_validated() {
        let mut scenario = minimal();
        scenario.environment.wind_speed = -1.0;
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "environment.wind_speed");
    }

    #[test]
    fn test_zero_ais_interval_rejected() {
        let mut scenario = minimal();
        scenario.ais.report_interval = DurationValue::Seconds(0.0);
        let err = SimulationConfig::from_scenario(&scenario).unwrap_err();
        assert_eq!(field_of(err), "ais.report_interval");
    }

    #[test]
    fn test_protocol_mode_from_str() {
        assert_eq!("0183".parse::<ProtocolMode>().unwrap(), ProtocolMode::Nmea0183);
        assert_eq!("2000".parse::<ProtocolMode>().unwrap(), ProtocolMode::Nmea2000);
        assert_eq!("Both".parse::<ProtocolMode>().unwrap(), ProtocolMode::Both);
        assert!("0180".parse::<ProtocolMode>().is_err());
    }
}
