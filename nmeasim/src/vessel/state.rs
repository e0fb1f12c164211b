//! Per-tick vessel state snapshot.

use std::time::Duration;

use super::identity::NavigationStatus;
use crate::coord::Coordinate;

/// Kinematic state of one vessel after a tick.
///
/// Owned and mutated only by its [`VesselModel`](super::VesselModel);
/// encoders receive copies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VesselState {
    pub position: Coordinate,
    /// Heading in degrees true, [0, 360).
    pub heading: f64,
    /// Speed over ground in knots.
    pub speed_knots: f64,
    /// Course over ground in degrees true, [0, 360).
    pub course_over_ground: f64,
    /// Rate of turn in degrees per minute, positive to starboard.
    /// `None` when not yet known.
    pub rate_of_turn: Option<f64>,
    pub navigation_status: NavigationStatus,
    /// Rudder angle in degrees, positive to starboard.
    pub rudder_angle: f64,
    /// Index of the current leg's origin waypoint.
    pub leg_index: usize,
    pub distance_into_leg_nm: f64,
    /// Simulated time spent on the speed profile.
    pub elapsed_profile_time: Duration,
}

impl VesselState {
    /// A vessel at rest at `position`.
    pub fn at_rest(position: Coordinate, heading: f64, status: NavigationStatus) -> Self {
        Self {
            position,
            heading,
            speed_knots: 0.0,
            course_over_ground: heading,
            rate_of_turn: None,
            navigation_status: status,
            rudder_angle: 0.0,
            leg_index: 0,
            distance_into_leg_nm: 0.0,
            elapsed_profile_time: Duration::ZERO,
        }
    }

    /// Speed in meters per second.
    pub fn speed_mps(&self) -> f64 {
        self.speed_knots * KNOTS_TO_MPS
    }
}

/// Knots to meters per second.
pub const KNOTS_TO_MPS: f64 = 1852.0 / 3600.0;
