//! Process-wide environment: wind, magnetic variation, depth.
//!
//! Built once from configuration and shared read-only by every encoder via
//! `Arc<EnvironmentState>`.

use crate::config::ConfigError;
use crate::coord::normalize_degrees;

/// Default true wind direction (degrees, direction the wind blows from).
pub const DEFAULT_WIND_DIRECTION: f64 = 270.0;

/// Default true wind speed in knots.
pub const DEFAULT_WIND_SPEED: f64 = 15.0;

/// Default magnetic variation in degrees (east positive).
pub const DEFAULT_VARIATION: f64 = -15.0;

/// Default water depth below the transducer in meters.
pub const DEFAULT_DEPTH_M: f64 = 10.0;

/// Characteristics of the simulated GNSS receiver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GnssFix {
    /// GGA fix quality (1 = GPS fix).
    pub quality: u8,
    pub satellites: u8,
    pub hdop: f64,
    pub pdop: f64,
    /// Antenna altitude above mean sea level in meters.
    pub altitude_m: f64,
    /// Geoid height above the WGS-84 ellipsoid in meters.
    pub geoidal_separation_m: f64,
}

impl Default for GnssFix {
    fn default() -> Self {
        Self {
            quality: 1,
            satellites: 8,
            hdop: 1.0,
            pdop: 2.0,
            altitude_m: 0.0,
            geoidal_separation_m: 0.0,
        }
    }
}

/// Wind as seen from a moving vessel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentWind {
    /// Angle relative to the bow, [0, 360), clockwise.
    pub angle: f64,
    /// Speed in knots.
    pub speed_knots: f64,
}

/// Shared environment state.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentState {
    /// True wind direction in degrees (from).
    pub wind_direction: f64,
    pub wind_speed_knots: f64,
    /// Magnetic variation in degrees, east positive.
    pub magnetic_variation: f64,
    /// Depth below transducer in meters.
    pub water_depth_m: f64,
    /// Transducer offset in meters: positive is distance to the waterline,
    /// negative is distance to the keel.
    pub depth_offset_m: f64,
    pub gnss: GnssFix,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self {
            wind_direction: DEFAULT_WIND_DIRECTION,
            wind_speed_knots: DEFAULT_WIND_SPEED,
            magnetic_variation: DEFAULT_VARIATION,
            water_depth_m: DEFAULT_DEPTH_M,
            depth_offset_m: 0.0,
            gnss: GnssFix::default(),
        }
    }
}

impl EnvironmentState {
    /// Check every field against its physical range.
    ///
    /// The wind direction is normalized into [0, 360).
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if !self.wind_direction.is_finite() {
            return Err(ConfigError::invalid(
                "environment.wind_direction",
                self.wind_direction,
                "must be a number",
            ));
        }
        self.wind_direction = normalize_degrees(self.wind_direction);

        if !self.wind_speed_knots.is_finite() || self.wind_speed_knots < 0.0 {
            return Err(ConfigError::invalid(
                "environment.wind_speed",
                self.wind_speed_knots,
                "must be a non-negative number",
            ));
        }
        if !self.magnetic_variation.is_finite() || self.magnetic_variation.abs() > 180.0 {
            return Err(ConfigError::invalid(
                "environment.variation",
                self.magnetic_variation,
                "must be between -180 and 180",
            ));
        }
        if !self.water_depth_m.is_finite() || self.water_depth_m < 0.0 {
            return Err(ConfigError::invalid(
                "environment.depth",
                self.water_depth_m,
                "must be a non-negative number",
            ));
        }
        if !self.depth_offset_m.is_finite() {
            return Err(ConfigError::invalid(
                "environment.depth_offset",
                self.depth_offset_m,
                "must be a number",
            ));
        }
        if self.gnss.satellites > 99 {
            return Err(ConfigError::invalid(
                "environment.satellites",
                self.gnss.satellites,
                "must be at most 99",
            ));
        }
        if !self.gnss.hdop.is_finite() || self.gnss.hdop < 0.0 {
            return Err(ConfigError::invalid(
                "environment.hdop",
                self.gnss.hdop,
                "must be a non-negative number",
            ));
        }
        Ok(self)
    }

    /// Convert a true bearing to magnetic.
    pub fn to_magnetic(&self, true_deg: f64) -> f64 {
        normalize_degrees(true_deg - self.magnetic_variation)
    }

    /// True wind angle relative to the bow, [0, 360).
    pub fn true_wind_angle(&self, heading: f64) -> f64 {
        normalize_degrees(self.wind_direction - heading)
    }

    /// Apparent wind for a vessel on `heading` at `speed_knots`.
    ///
    /// Vector sum of the true wind and the headwind induced by the vessel's
    /// own motion, expressed in the vessel frame.
    pub fn apparent_wind(&self, heading: f64, speed_knots: f64) -> ApparentWind {
        let twa = self.true_wind_angle(heading).to_radians();

        // x along the bow, y to starboard; both in "wind from" convention
        let x = self.wind_speed_knots * twa.cos() + speed_knots;
        let y = self.wind_speed_knots * twa.sin();

        let speed_knots = x.hypot(y);
        let angle = if speed_knots == 0.0 {
            0.0
        } else {
            normalize_degrees(y.atan2(x).to_degrees())
        };

        ApparentWind { angle, speed_knots }
    }
}
