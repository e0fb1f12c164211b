//! Vessel kinematics.
//!
//! A [`VesselModel`] owns one vessel's identity, motion source and state, and
//! advances the state once per simulation tick.

use std::time::Duration;

use super::identity::{NavigationStatus, VesselIdentity};
use super::state::VesselState;
use super::steering::Helm;
use crate::config::ConfigError;
use crate::coord::{angle_difference, destination, normalize_degrees, Coordinate};
use crate::route::{EndOfRoute, Route, RouteTracker, SpeedProfile};

/// Longest step a dead-reckoning vessel integrates in one tick.
pub const MAX_DEAD_RECKONING_STEP: Duration = Duration::from_secs(60);

/// How a vessel decides where to go.
#[derive(Debug, Clone)]
pub enum Motion {
    /// Follow waypoints at the speed given by a profile.
    Route {
        tracker: RouteTracker,
        profile: SpeedProfile,
    },
    /// Hold a constant speed and course.
    DeadReckoning { speed_knots: f64, course: f64 },
}

/// Kinematic model for one vessel.
#[derive(Debug, Clone)]
pub struct VesselModel {
    identity: VesselIdentity,
    motion: Motion,
    state: VesselState,
    helm: Helm,
}

impl VesselModel {
    /// A vessel that follows `route` using `profile`.
    pub fn on_route(
        identity: VesselIdentity,
        route: Route,
        profile: SpeedProfile,
        end_of_route: EndOfRoute,
    ) -> Self {
        let tracker = RouteTracker::new(route, end_of_route);
        let speed = if tracker.is_finished() {
            0.0
        } else {
            profile.speed_at(Duration::ZERO)
        };
        let status =
            NavigationStatus::for_speed(NavigationStatus::default(), speed, identity.ship_type);

        let mut state = VesselState::at_rest(tracker.position(), tracker.heading(), status);
        state.speed_knots = speed;

        Self {
            identity,
            motion: Motion::Route { tracker, profile },
            helm: Helm::new(state.heading),
            state,
        }
    }

    /// A vessel holding constant speed and course from `position`.
    ///
    /// # Errors
    ///
    /// Rejects negative or non-finite speed and non-finite course.
    pub fn dead_reckoning(
        identity: VesselIdentity,
        position: Coordinate,
        speed_knots: f64,
        course: f64,
        status: NavigationStatus,
    ) -> Result<Self, ConfigError> {
        if !speed_knots.is_finite() || speed_knots < 0.0 {
            return Err(ConfigError::invalid(
                "speed",
                speed_knots,
                "must be a non-negative number",
            ));
        }
        if !course.is_finite() {
            return Err(ConfigError::invalid("course", course, "must be a number"));
        }
        let course = normalize_degrees(course);

        let mut state = VesselState::at_rest(position, course, status);
        state.speed_knots = speed_knots;
        state.rate_of_turn = Some(0.0);

        Ok(Self {
            identity,
            motion: Motion::DeadReckoning {
                speed_knots,
                course,
            },
            helm: Helm::new(course),
            state,
        })
    }

    /// Advance the vessel by `dt` of simulated time and return the new state.
    pub fn tick(&mut self, dt: Duration) -> VesselState {
        let previous_heading = self.state.heading;

        match &mut self.motion {
            Motion::Route { tracker, profile } => {
                let speed = profile.speed_at(self.state.elapsed_profile_time);
                self.state.elapsed_profile_time += dt;

                let advance = tracker.advance(speed * hours(dt));
                self.state.position = advance.position;
                self.state.heading = advance.heading;
                self.state.course_over_ground = advance.heading;
                self.state.speed_knots = if tracker.is_finished() { 0.0 } else { speed };
                self.state.leg_index = tracker.leg_index();
                self.state.distance_into_leg_nm = tracker.distance_into_leg_nm();

                if advance.leg_completed() {
                    tracing::info!(
                        mmsi = %self.identity.mmsi,
                        leg = tracker.leg_index(),
                        finished = tracker.is_finished(),
                        "Vessel reached waypoint"
                    );
                }
            }
            Motion::DeadReckoning {
                speed_knots,
                course,
            } => {
                self.state.elapsed_profile_time += dt;
                let step = dt.min(MAX_DEAD_RECKONING_STEP);
                self.state.position =
                    destination(self.state.position, *course, *speed_knots * hours(step));
                self.state.heading = *course;
                self.state.course_over_ground = *course;
                self.state.speed_knots = *speed_knots;
            }
        }

        self.state.rudder_angle = self.helm.steer(self.state.heading, dt);

        let minutes = dt.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.state.rate_of_turn =
                Some(angle_difference(previous_heading, self.state.heading) / minutes);
        }

        self.state.navigation_status = NavigationStatus::for_speed(
            self.state.navigation_status,
            self.state.speed_knots,
            self.identity.ship_type,
        );

        self.state
    }

    pub fn identity(&self) -> &VesselIdentity {
        &self.identity
    }

    /// The most recent state.
    pub fn state(&self) -> &VesselState {
        &self.state
    }

    /// Route tracker, for route-following vessels.
    pub fn tracker(&self) -> Option<&RouteTracker> {
        match &self.motion {
            Motion::Route { tracker, .. } => Some(tracker),
            Motion::DeadReckoning { .. } => None,
        }
    }
}

fn hours(dt: Duration) -> f64 {
    dt.as_secs_f64() / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{distance_nm, parse_position};
    use crate::route::SpeedSegment;
    use crate::vessel::MAX_RUDDER_ANGLE;
    use crate::vessel::{Mmsi, ShipType};

    fn identity(mmsi: u64, ship_type: ShipType) -> VesselIdentity {
        VesselIdentity::new(Mmsi::new(mmsi).unwrap(), "TEST", ship_type).unwrap()
    }

    fn bay_route() -> Route {
        Route::new(vec![
            parse_position("37° 40.00' N, 122° 22.00' W").unwrap(),
            parse_position("37° 41.00' N, 122° 21.00' W").unwrap(),
        ])
        .unwrap()
    }

    fn ten_knots() -> SpeedProfile {
        SpeedProfile::new(vec![
            SpeedSegment::timed(Duration::from_secs(60), 10.0),
            SpeedSegment::indefinite(10.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_sixty_ticks_at_ten_knots() {
        let route = bay_route();
        let start = route.waypoints()[0];
        let mut model = VesselModel::on_route(
            identity(366_000_001, ShipType::Cargo),
            route,
            ten_knots(),
            EndOfRoute::Hold,
        );

        for _ in 0..60 {
            model.tick(Duration::from_secs(1));
        }

        let state = model.state();
        let expected = 10.0 / 60.0;
        assert!((distance_nm(start, state.position) - expected).abs() < 1e-9);
        assert!((state.distance_into_leg_nm - expected).abs() < 1e-9);
        assert_eq!(state.elapsed_profile_time, Duration::from_secs(60));
        assert_eq!(state.speed_knots, 10.0);
        assert_eq!(state.heading, state.course_over_ground);
        assert_eq!(state.leg_index, 0);
    }

    #[test]
    fn test_speed_follows_profile_steps() {
        let profile = SpeedProfile::new(vec![
            SpeedSegment::timed(Duration::from_secs(2), 6.0),
            SpeedSegment::indefinite(12.0),
        ])
        .unwrap();
        let mut model = VesselModel::on_route(
            identity(366_000_002, ShipType::Tug),
            bay_route(),
            profile,
            EndOfRoute::Hold,
        );

        let speeds: Vec<f64> = (0..4)
            .map(|_| model.tick(Duration::from_secs(1)).speed_knots)
            .collect();
        assert_eq!(speeds, vec![6.0, 6.0, 12.0, 12.0]);
    }

    #[test]
    fn test_terminal_hold() {
        let mut model = VesselModel::on_route(
            identity(366_000_003, ShipType::Cargo),
            bay_route(),
            SpeedProfile::constant(3600.0).unwrap(),
            EndOfRoute::Hold,
        );

        // 1 nm per second, the leg is ~1.27 nm
        model.tick(Duration::from_secs(1));
        let arrived = model.tick(Duration::from_secs(1));
        assert!(model.tracker().unwrap().is_finished());
        assert_eq!(arrived.speed_knots, 0.0);
        assert_eq!(arrived.navigation_status, NavigationStatus::AtAnchor);

        for _ in 0..10 {
            let held = model.tick(Duration::from_secs(1));
            assert_eq!(held.position, arrived.position);
            assert_eq!(held.heading, arrived.heading);
            assert_eq!(held.rate_of_turn, Some(0.0));
        }
    }

    #[test]
    fn test_rate_of_turn_at_corner() {
        let route = Route::new(vec![
            Coordinate::new(0.0, 0.0).unwrap(),
            Coordinate::new(0.0, 0.1).unwrap(),
            Coordinate::new(0.1, 0.1).unwrap(),
        ])
        .unwrap();
        let first_leg = route.total_distance_nm() / 2.0;
        let mut model = VesselModel::on_route(
            identity(366_000_004, ShipType::Cargo),
            route,
            // Slightly more than one leg per minute so the corner is passed
            SpeedProfile::constant(first_leg * 1.01 * 60.0).unwrap(),
            EndOfRoute::Hold,
        );

        // Turn from east to north over one minute
        let state = model.tick(Duration::from_secs(60));
        let rot = state.rate_of_turn.unwrap();
        assert!((rot + 90.0).abs() < 0.1, "rot = {}", rot);
    }

    #[test]
    fn test_rudder_answers_leg_change() {
        let route = Route::new(vec![
            Coordinate::new(0.0, 0.0).unwrap(),
            Coordinate::new(0.0, 0.1).unwrap(),
            Coordinate::new(0.1, 0.1).unwrap(),
        ])
        .unwrap();
        let first_leg = route.total_distance_nm() / 2.0;
        let mut model = VesselModel::on_route(
            identity(366_000_006, ShipType::Cargo),
            route,
            // Reaches the corner during the fifth one-second tick
            SpeedProfile::constant(first_leg * 3600.0 / 4.5).unwrap(),
            EndOfRoute::Hold,
        );

        for _ in 0..4 {
            assert!(model.tick(Duration::from_secs(1)).rudder_angle.abs() < 1e-6);
        }

        // East to north is a turn to port
        let turned = model.tick(Duration::from_secs(1));
        assert_eq!(turned.leg_index, 1);
        assert!((turned.rudder_angle + 3.0).abs() < 1e-6);

        let mut hardest: f64 = 0.0;
        for _ in 0..600 {
            hardest = hardest.min(model.tick(Duration::from_secs(1)).rudder_angle);
        }
        assert!((hardest + MAX_RUDDER_ANGLE).abs() < 1e-6);
        assert!(model.state().rudder_angle.abs() < 0.5);
    }

    #[test]
    fn test_sailing_vessel_status() {
        let model = VesselModel::on_route(
            identity(366_000_005, ShipType::Sailing),
            bay_route(),
            ten_knots(),
            EndOfRoute::Hold,
        );
        assert_eq!(
            model.state().navigation_status,
            NavigationStatus::UnderwaySailing
        );
    }

    #[test]
    fn test_dead_reckoning() {
        let start = Coordinate::new(37.8, -122.4).unwrap();
        let mut model = VesselModel::dead_reckoning(
            identity(366_123_456, ShipType::Cargo),
            start,
            12.0,
            45.0,
            NavigationStatus::UnderwayUsingEngine,
        )
        .unwrap();

        let state = model.tick(Duration::from_secs(10));
        assert!((distance_nm(start, state.position) - 12.0 * 10.0 / 3600.0).abs() < 1e-9);
        assert_eq!(state.heading, 45.0);
        assert_eq!(state.rate_of_turn, Some(0.0));
        assert_eq!(state.rudder_angle, 0.0);
    }

    #[test]
    fn test_dead_reckoning_step_is_capped() {
        let start = Coordinate::new(0.0, 0.0).unwrap();
        let mut model = VesselModel::dead_reckoning(
            identity(366_123_457, ShipType::Cargo),
            start,
            60.0,
            90.0,
            NavigationStatus::UnderwayUsingEngine,
        )
        .unwrap();

        let state = model.tick(Duration::from_secs(600));
        assert!((distance_nm(start, state.position) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dead_reckoning_rejects_bad_speed() {
        let result = VesselModel::dead_reckoning(
            identity(366_123_458, ShipType::Cargo),
            Coordinate::new(0.0, 0.0).unwrap(),
            -1.0,
            0.0,
            NavigationStatus::default(),
        );
        assert!(result.is_err());
    }
}
