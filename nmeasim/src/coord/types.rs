//! Coordinate type definitions

use std::fmt;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range (normalized to the half-open interval (-180, 180])
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A geographic position in signed decimal degrees.
///
/// Latitude is north-positive and always within [-90, 90]. Longitude is
/// east-positive and normalized into (-180, 180] on construction, so two
/// coordinates describing the same meridian compare equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

/// A route waypoint.
pub type Waypoint = Coordinate;

impl Coordinate {
    /// Creates a coordinate, rejecting out-of-range latitude and non-finite input.
    ///
    /// Longitude outside (-180, 180] is wrapped rather than rejected.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() {
            return Err(CoordError::InvalidLongitude(lon));
        }
        Ok(Self {
            lat,
            lon: normalize_longitude(lon),
        })
    }

    /// Builds a coordinate from the output of spherical trigonometry.
    ///
    /// `asin` can overshoot ±90 by an ulp, so latitude is clamped here
    /// instead of rejected.
    pub(crate) fn from_radians(lat_rad: f64, lon_rad: f64) -> Self {
        Self {
            lat: lat_rad.to_degrees().clamp(MIN_LAT, MAX_LAT),
            lon: normalize_longitude(lon_rad.to_degrees()),
        }
    }

    /// Latitude in degrees north.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees east.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    #[inline]
    pub(crate) fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    #[inline]
    pub(crate) fn lon_rad(&self) -> f64 {
        self.lon.to_radians()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Wraps a longitude into (-180, 180].
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= MIN_LON {
        MAX_LON
    } else {
        wrapped
    }
}

/// Wraps an angle into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Direction to steer to regain the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
}

impl Steer {
    /// Single-letter form used by NMEA sentences.
    pub fn as_char(&self) -> char {
        match self {
            Steer::Left => 'L',
            Steer::Right => 'R',
        }
    }
}

/// Cross-track error relative to a route leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossTrack {
    /// Magnitude of the off-track distance in nautical miles.
    pub distance_nm: f64,
    /// Direction to steer back onto the track.
    pub steer: Steer,
}

/// Errors that can occur while building or parsing coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside the valid range (-90.0 to 90.0) or not finite
    InvalidLatitude(f64),
    /// Longitude is not a finite number
    InvalidLongitude(f64),
    /// Text could not be interpreted as a coordinate
    Unparseable(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(f, "Invalid longitude: {} (must be a finite number)", lon)
            }
            CoordError::Unparseable(text) => {
                write!(f, "Unable to parse coordinate: '{}'", text)
            }
        }
    }
}

impl std::error::Error for CoordError {}
