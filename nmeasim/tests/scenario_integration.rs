//! Integration tests for whole-scenario behavior.
//!
//! These tests verify:
//! - Own-ship motion along a route over a known number of ticks
//! - Checksums of every emitted record
//! - Holding position at the end of a route
//! - The same run driven through the clock with paused time

use std::time::Duration;

use chrono::{TimeZone, Utc};
use nmeasim::config::{DurationValue, NetworkSettings, ScenarioFile, SimulationConfig, SpeedSettings};
use nmeasim::coord::{distance_nm, parse_position};
use nmeasim::nmea0183::checksum;
use nmeasim::route::EndOfRoute;
use nmeasim::sim::{Engine, RunState, Simulator};

// =============================================================================
// Test Helpers
// =============================================================================

const FIRST: &str = "37° 40.00' N, 122° 22.00' W";
const SECOND: &str = "37° 41.00' N, 122° 21.00' W";

fn speed(duration: Option<&str>, knots: f64) -> SpeedSettings {
    SpeedSettings {
        duration: duration.map(|d| DurationValue::Text(d.to_string())),
        speed: knots,
    }
}

fn bay_leg() -> ScenarioFile {
    ScenarioFile {
        network: NetworkSettings {
            port: 0,
            ..NetworkSettings::default()
        },
        update_rate: 1.0,
        waypoints: vec![FIRST.into(), SECOND.into()],
        speed_profile: vec![speed(Some("1m"), 10.0), speed(None, 10.0)],
        ..ScenarioFile::default()
    }
}

fn engine(scenario: &ScenarioFile) -> Engine {
    let config = SimulationConfig::from_scenario(scenario).unwrap();
    Engine::new(&config, Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()).unwrap()
}

// =============================================================================
// Route motion
// =============================================================================

#[test]
fn test_sixty_ticks_along_first_leg() {
    let mut engine = engine(&bay_leg());
    let start = parse_position(FIRST).unwrap();

    let mut records = 0;
    for _ in 0..60 {
        let out = engine.tick();
        assert_eq!(out.encode_errors, 0);
        for record in out.sentences.iter() {
            let text = record.as_text().expect("0183 output is text");
            assert!(checksum::verify(text), "bad checksum: {text}");
            assert!(text.ends_with("\r\n"));
            records += 1;
        }
    }
    assert!(records >= 60);

    // 10 knots for one minute
    let expected_nm = 10.0 / 60.0;
    let own = engine.own_ship().unwrap();
    assert_eq!(own.leg_index, 0);
    assert!((own.distance_into_leg_nm - expected_nm).abs() < 1e-9);
    assert!((distance_nm(start, own.position) - expected_nm).abs() < 1e-4);
    assert!((own.speed_knots - 10.0).abs() < 1e-9);
    assert_eq!(engine.elapsed(), Duration::from_secs(60));
}

#[test]
fn test_terminal_hold_keeps_position_and_heading() {
    let scenario = ScenarioFile {
        waypoints: vec!["37.7000,-122.3000".into(), "37.7008,-122.3000".into()],
        speed_profile: vec![speed(None, 10.0)],
        end_of_route: EndOfRoute::Hold,
        ..bay_leg()
    };
    let mut engine = engine(&scenario);
    let end = parse_position("37.7008,-122.3000").unwrap();

    // The leg is about 0.048 nm, well under 40 s at 10 knots
    for _ in 0..40 {
        engine.tick();
    }
    let held = *engine.own_ship().unwrap();
    assert!(distance_nm(held.position, end) < 1e-6);
    assert_eq!(held.speed_knots, 0.0);

    for _ in 0..10 {
        engine.tick();
        let now = engine.own_ship().unwrap();
        assert_eq!(now.position, held.position);
        assert_eq!(now.heading, held.heading);
        assert_eq!(now.speed_knots, 0.0);
    }
}

// =============================================================================
// Clock-driven run
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_clock_driven_run_matches_engine() {
    let scenario = ScenarioFile {
        duration_seconds: Some(DurationValue::Seconds(60.0)),
        ..bay_leg()
    };
    let mut sim = Simulator::from_config(SimulationConfig::from_scenario(&scenario).unwrap());
    let mut rx = sim.subscribe();
    sim.start().await.unwrap();

    let status = sim.wait_finished().await.unwrap();
    assert_eq!(status.state, RunState::Finished);
    assert_eq!(status.ticks, 60);
    assert_eq!(status.encode_errors, 0);

    let mut emitted = 0;
    while let Ok(batch) = rx.try_recv() {
        for record in batch.iter() {
            assert!(checksum::verify(record.as_text().unwrap()));
            emitted += 1;
        }
    }
    assert_eq!(emitted, status.sentences_emitted);

    let own = status.own_ship.unwrap();
    assert!((own.distance_into_leg_nm - 10.0 / 60.0).abs() < 1e-9);

    sim.stop().await.unwrap();
}
