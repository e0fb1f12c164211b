//! Rudder simulation.
//!
//! Route vessels change heading instantly at a waypoint. The [`Helm`] keeps
//! a separate ship's head that swings toward the ordered heading under
//! rudder, so the reported rudder angle deflects on a turn and eases back
//! to midships as the ship's head catches up.

use std::time::Duration;

use crate::coord::{angle_difference, normalize_degrees};

/// Degrees of rudder per degree of heading error.
pub const RUDDER_GAIN: f64 = 2.0;

/// Hard-over rudder angle in degrees.
pub const MAX_RUDDER_ANGLE: f64 = 35.0;

/// Fastest the rudder can move, in degrees per second.
pub const RUDDER_RATE: f64 = 3.0;

/// Turn rate at hard-over rudder, in degrees per second.
const FULL_RUDDER_TURN_RATE: f64 = 1.0;

/// Integration step; longer ticks are split.
const STEP: f64 = 1.0;

/// Proportional helm with rudder angle and rate limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Helm {
    ship_head: f64,
    rudder: f64,
}

impl Helm {
    /// Midships, with the ship's head on `heading`.
    pub fn new(heading: f64) -> Self {
        Self {
            ship_head: normalize_degrees(heading),
            rudder: 0.0,
        }
    }

    /// Current rudder angle, positive to starboard.
    pub fn rudder(&self) -> f64 {
        self.rudder
    }

    /// Steer toward `ordered` for `dt` and return the new rudder angle.
    pub fn steer(&mut self, ordered: f64, dt: Duration) -> f64 {
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step = remaining.min(STEP);
            remaining -= step;

            let error = angle_difference(self.ship_head, ordered);
            let wanted = (RUDDER_GAIN * error).clamp(-MAX_RUDDER_ANGLE, MAX_RUDDER_ANGLE);
            let max_change = RUDDER_RATE * step;
            self.rudder += (wanted - self.rudder).clamp(-max_change, max_change);

            let turn = self.rudder / MAX_RUDDER_ANGLE * FULL_RUDDER_TURN_RATE * step;
            self.ship_head = normalize_degrees(self.ship_head + turn);
        }
        self.rudder
    }
}
