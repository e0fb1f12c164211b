//! Route leg tracking.
//!
//! The [`RouteTracker`] converts traveled distance into a position and
//! heading along a sequence of great-circle legs.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::coord::{
    cross_track, distance_nm, final_bearing, initial_bearing, interpolate, Coordinate,
    CrossTrack, Waypoint,
};

/// Distance from the active waypoint at which it counts as reached.
pub const ARRIVAL_RADIUS_NM: f64 = 0.1;

/// Remaining leg distance below which the vessel is considered at the
/// waypoint for heading purposes.
const AT_WAYPOINT_NM: f64 = 1e-9;

/// What happens when the vessel reaches the last waypoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfRoute {
    /// Stop at the final waypoint with heading frozen.
    #[default]
    Hold,
    /// Sail from the final waypoint back to the first and start over.
    Loop,
    /// Retrace the route backwards, then forwards again.
    Reverse,
}

/// An ordered, non-empty list of waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    waypoints: Vec<Waypoint>,
}

impl Route {
    /// Build a route.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyRoute`] if `waypoints` is empty.
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self, ConfigError> {
        if waypoints.is_empty() {
            return Err(ConfigError::EmptyRoute);
        }
        Ok(Self { waypoints })
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Never true for a constructed route.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Sum of the great-circle lengths of all forward legs.
    pub fn total_distance_nm(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|w| distance_nm(w[0], w[1]))
            .sum()
    }
}

/// The leg currently being sailed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    /// Index of the origin waypoint in the route.
    pub from_index: usize,
    /// Index of the destination waypoint in the route.
    pub to_index: usize,
    pub from: Coordinate,
    pub to: Coordinate,
    pub length_nm: f64,
}

/// Result of [`RouteTracker::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub position: Coordinate,
    /// Heading in degrees true.
    pub heading: f64,
    /// Number of legs finished during this advance.
    pub legs_completed: usize,
}

impl Advance {
    pub fn leg_completed(&self) -> bool {
        self.legs_completed > 0
    }
}

/// Tracks progress along a [`Route`].
#[derive(Debug, Clone)]
pub struct RouteTracker {
    route: Route,
    policy: EndOfRoute,
    from_index: usize,
    to_index: usize,
    forward: bool,
    leg_length_nm: f64,
    distance_into_leg_nm: f64,
    position: Coordinate,
    heading: f64,
    finished: bool,
}

impl RouteTracker {
    /// Start at the first waypoint, pointed along the first leg.
    ///
    /// A single-waypoint route starts (and stays) finished, holding the
    /// waypoint with heading 0.
    pub fn new(route: Route, policy: EndOfRoute) -> Self {
        let start = route.waypoints[0];
        let mut tracker = Self {
            route,
            policy,
            from_index: 0,
            to_index: 0,
            forward: true,
            leg_length_nm: 0.0,
            distance_into_leg_nm: 0.0,
            position: start,
            heading: 0.0,
            finished: true,
        };

        if tracker.route.len() > 1 {
            tracker.finished = false;
            tracker.enter_leg(0, 1);
            // A cyclic route with no length would spin forever
            if policy != EndOfRoute::Hold && tracker.route.total_distance_nm() == 0.0 {
                tracker.finished = true;
            }
        }
        tracker.update_position();
        tracker
    }

    /// Move `distance_nm` further along the route.
    ///
    /// Overshoot past a waypoint carries into the next leg. At the end of a
    /// [`EndOfRoute::Hold`] route further calls are no-ops.
    pub fn advance(&mut self, distance_nm: f64) -> Advance {
        let mut legs_completed = 0;

        if !self.finished && distance_nm > 0.0 {
            let mut into_leg = self.distance_into_leg_nm + distance_nm;

            while into_leg >= self.leg_length_nm {
                into_leg -= self.leg_length_nm;
                legs_completed += 1;

                match self.next_target() {
                    Some((from, to)) => self.enter_leg(from, to),
                    None => {
                        self.finished = true;
                        into_leg = self.leg_length_nm;
                        break;
                    }
                }
            }
            self.distance_into_leg_nm = into_leg;

            if legs_completed > 0 {
                tracing::debug!(
                    legs_completed,
                    from = self.from_index,
                    to = self.to_index,
                    finished = self.finished,
                    "Route leg completed"
                );
            }
        }

        self.update_position();
        Advance {
            position: self.position,
            heading: self.heading,
            legs_completed,
        }
    }

    fn enter_leg(&mut self, from: usize, to: usize) {
        self.from_index = from;
        self.to_index = to;
        self.leg_length_nm = distance_nm(self.route.waypoints[from], self.route.waypoints[to]);
        self.distance_into_leg_nm = 0.0;
    }

    /// The leg after the current one, or `None` when the route is done.
    fn next_target(&mut self) -> Option<(usize, usize)> {
        let last = self.route.len() - 1;
        let at = self.to_index;

        if self.forward {
            if at < last {
                return Some((at, at + 1));
            }
            match self.policy {
                EndOfRoute::Hold => None,
                EndOfRoute::Loop => Some((at, 0)),
                EndOfRoute::Reverse => {
                    self.forward = false;
                    Some((at, at - 1))
                }
            }
        } else if at > 0 {
            Some((at, at - 1))
        } else {
            self.forward = true;
            Some((0, 1))
        }
    }

    fn update_position(&mut self) {
        let leg_from = self.route.waypoints[self.from_index];
        let leg_to = self.route.waypoints[self.to_index];

        if self.route.len() == 1 {
            self.position = leg_from;
            return;
        }

        if self.finished {
            self.position = leg_to;
            if self.leg_length_nm > 0.0 {
                self.heading = final_bearing(leg_from, leg_to);
            }
            return;
        }

        self.position = if self.leg_length_nm > 0.0 {
            interpolate(
                leg_from,
                leg_to,
                self.distance_into_leg_nm / self.leg_length_nm,
            )
        } else {
            leg_from
        };

        // On a great circle the heading changes along the leg
        self.heading = if self.leg_length_nm - self.distance_into_leg_nm > AT_WAYPOINT_NM {
            initial_bearing(self.position, leg_to)
        } else {
            final_bearing(leg_from, leg_to)
        };
    }

    /// Current position.
    pub fn position(&self) -> Coordinate {
        self.position
    }

    /// Current heading in degrees true.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The route being tracked.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// True once a [`EndOfRoute::Hold`] route has reached its last waypoint,
    /// or for a single-waypoint route.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The leg being sailed (the final leg once finished). `None` for a
    /// single-waypoint route.
    pub fn current_leg(&self) -> Option<Leg> {
        if self.route.len() < 2 {
            return None;
        }
        Some(Leg {
            from_index: self.from_index,
            to_index: self.to_index,
            from: self.route.waypoints[self.from_index],
            to: self.route.waypoints[self.to_index],
            length_nm: self.leg_length_nm,
        })
    }

    /// Index of the current leg's origin waypoint.
    pub fn leg_index(&self) -> usize {
        self.from_index
    }

    pub fn distance_into_leg_nm(&self) -> f64 {
        self.distance_into_leg_nm
    }

    /// Great-circle distance from the current position to the active waypoint.
    pub fn distance_to_next_nm(&self) -> f64 {
        distance_nm(self.position, self.route.waypoints[self.to_index])
    }

    /// Bearing from the current position to the active waypoint.
    pub fn bearing_to_next(&self) -> f64 {
        initial_bearing(self.position, self.route.waypoints[self.to_index])
    }

    /// Cross-track error against the current leg.
    pub fn cross_track(&self) -> Option<CrossTrack> {
        self.current_leg()
            .map(|leg| cross_track(leg.from, leg.to, self.position))
    }

    /// True when within [`ARRIVAL_RADIUS_NM`] of the active waypoint.
    pub fn arrived(&self) -> bool {
        self.finished || self.distance_to_next_nm() < ARRIVAL_RADIUS_NM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::angle_difference;

    fn wp(lat: f64, lon: f64) -> Waypoint {
        Coordinate::new(lat, lon).unwrap()
    }

    fn three_leg_route() -> Route {
        Route::new(vec![wp(0.0, 0.0), wp(0.0, 1.0), wp(1.0, 1.0), wp(1.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_empty_route_rejected() {
        assert!(matches!(Route::new(vec![]), Err(ConfigError::EmptyRoute)));
    }

    #[test]
    fn test_starts_on_first_leg() {
        let tracker = RouteTracker::new(three_leg_route(), EndOfRoute::Hold);
        assert_eq!(tracker.position(), wp(0.0, 0.0));
        assert!((tracker.heading() - 90.0).abs() < 1e-9);
        assert_eq!(tracker.leg_index(), 0);
        assert!(!tracker.is_finished());
    }

    #[test]
    fn test_advance_exact_leg_length_completes_with_zero_remainder() {
        let route = Route::new(vec![wp(0.0, 0.0), wp(0.0, 1.0)]).unwrap();
        let leg = distance_nm(wp(0.0, 0.0), wp(0.0, 1.0));
        let mut tracker = RouteTracker::new(route, EndOfRoute::Hold);

        let advance = tracker.advance(leg);
        assert_eq!(advance.legs_completed, 1);
        assert!(tracker.is_finished());
        assert_eq!(advance.position, wp(0.0, 1.0));
        assert!(tracker.distance_to_next_nm() < 1e-9);
    }

    #[test]
    fn test_overshoot_carries_into_next_leg() {
        let mut tracker = RouteTracker::new(three_leg_route(), EndOfRoute::Hold);
        let first = tracker.current_leg().unwrap().length_nm;
        let epsilon = 0.25;

        let advance = tracker.advance(first + epsilon);
        assert!(advance.leg_completed());
        assert_eq!(tracker.leg_index(), 1);
        assert!((tracker.distance_into_leg_nm() - epsilon).abs() < 1e-9);
        assert!((distance_nm(wp(0.0, 1.0), advance.position) - epsilon).abs() < 1e-6);
        // Second leg runs due north
        assert!(angle_difference(0.0, advance.heading).abs() < 1e-6);
    }

    #[test]
    fn test_partial_advance_interpolates() {
        let mut tracker = RouteTracker::new(three_leg_route(), EndOfRoute::Hold);
        let leg = tracker.current_leg().unwrap().length_nm;

        let advance = tracker.advance(leg / 2.0);
        assert_eq!(advance.legs_completed, 0);
        assert!(advance.position.lat().abs() < 1e-9);
        assert!((advance.position.lon() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_legs_in_one_advance() {
        let mut tracker = RouteTracker::new(three_leg_route(), EndOfRoute::Hold);
        let route_length = tracker.route().total_distance_nm();

        let advance = tracker.advance(route_length - 1.0);
        assert_eq!(advance.legs_completed, 2);
        assert_eq!(tracker.leg_index(), 2);
    }

    #[test]
    fn test_hold_at_final_waypoint() {
        let mut tracker = RouteTracker::new(three_leg_route(), EndOfRoute::Hold);
        tracker.advance(10_000.0);
        assert!(tracker.is_finished());

        let heading = tracker.heading();
        let position = tracker.position();
        assert_eq!(position, wp(1.0, 0.0));

        for _ in 0..5 {
            let advance = tracker.advance(5.0);
            assert_eq!(advance.position, position);
            assert_eq!(advance.heading, heading);
            assert_eq!(advance.legs_completed, 0);
        }
        assert!(tracker.arrived());
    }

    #[test]
    fn test_loop_returns_to_start() {
        let route = Route::new(vec![wp(0.0, 0.0), wp(0.0, 1.0)]).unwrap();
        let leg = route.total_distance_nm();
        let mut tracker = RouteTracker::new(route, EndOfRoute::Loop);

        tracker.advance(leg + 0.5);
        let closing = tracker.current_leg().unwrap();
        assert_eq!((closing.from_index, closing.to_index), (1, 0));

        tracker.advance(leg);
        let again = tracker.current_leg().unwrap();
        assert_eq!((again.from_index, again.to_index), (0, 1));
        assert!(!tracker.is_finished());
    }

    #[test]
    fn test_reverse_ping_pongs() {
        let mut tracker = RouteTracker::new(three_leg_route(), EndOfRoute::Reverse);
        let total = tracker.route().total_distance_nm();

        tracker.advance(total + 0.1);
        let leg = tracker.current_leg().unwrap();
        assert_eq!((leg.from_index, leg.to_index), (3, 2));

        tracker.advance(total);
        let leg = tracker.current_leg().unwrap();
        assert_eq!((leg.from_index, leg.to_index), (0, 1));
    }

    #[test]
    fn test_single_waypoint_is_parked() {
        let route = Route::new(vec![wp(37.0, -122.0)]).unwrap();
        let mut tracker = RouteTracker::new(route, EndOfRoute::Loop);
        assert!(tracker.is_finished());
        assert!(tracker.current_leg().is_none());
        assert!(tracker.cross_track().is_none());

        let advance = tracker.advance(3.0);
        assert_eq!(advance.position, wp(37.0, -122.0));
    }

    #[test]
    fn test_zero_length_cyclic_route_does_not_spin() {
        let route = Route::new(vec![wp(1.0, 1.0), wp(1.0, 1.0)]).unwrap();
        let mut tracker = RouteTracker::new(route, EndOfRoute::Loop);
        assert!(tracker.is_finished());
        tracker.advance(1.0);
    }

    #[test]
    fn test_zero_length_leg_is_skipped() {
        let route = Route::new(vec![wp(0.0, 0.0), wp(0.0, 0.0), wp(0.0, 1.0)]).unwrap();
        let mut tracker = RouteTracker::new(route, EndOfRoute::Hold);

        let advance = tracker.advance(1.0);
        assert_eq!(advance.legs_completed, 1);
        assert_eq!(tracker.leg_index(), 1);
        assert!((tracker.distance_into_leg_nm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cross_track_on_leg_is_zero() {
        let mut tracker = RouteTracker::new(three_leg_route(), EndOfRoute::Hold);
        tracker.advance(10.0);
        let xte = tracker.cross_track().unwrap();
        assert!(xte.distance_nm < 1e-6);
    }

    #[test]
    fn test_arrival_radius() {
        let route = Route::new(vec![wp(0.0, 0.0), wp(0.0, 1.0)]).unwrap();
        let leg = route.total_distance_nm();
        let mut tracker = RouteTracker::new(route, EndOfRoute::Hold);

        tracker.advance(leg - 0.5);
        assert!(!tracker.arrived());
        tracker.advance(0.45);
        assert!(tracker.arrived());
        assert!((tracker.bearing_to_next() - 90.0).abs() < 1e-3);
    }
}
