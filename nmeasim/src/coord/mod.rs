//! Geographic coordinates and great-circle navigation math.
//!
//! All functions use a spherical earth model, which is accurate well below
//! the precision of the sentences this crate emits.
//!
//! # Coordinate System
//!
//! - Latitude: degrees north (-90 to 90)
//! - Longitude: degrees east, normalized to (-180, 180]
//! - Bearing: degrees true (0-360, 0=north, 90=east)
//! - Distance: nautical miles (1 nm = 1852 meters)

mod parse;
mod types;

pub use parse::{parse_coordinate, parse_position};
pub use types::{
    normalize_degrees, normalize_longitude, Coordinate, CoordError, CrossTrack, Steer, Waypoint,
    MAX_LAT, MAX_LON, MIN_LAT, MIN_LON,
};

/// Earth's mean radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Meters per nautical mile.
pub const METERS_PER_NM: f64 = 1852.0;

/// Angular separations below this are treated as coincident points.
const COINCIDENT_RAD: f64 = 1e-12;

/// Great-circle distance between two positions (haversine formula).
///
/// # Example
///
/// ```
/// use nmeasim::coord::{distance_nm, Coordinate};
///
/// let a = Coordinate::new(0.0, 0.0).unwrap();
/// let b = Coordinate::new(1.0, 0.0).unwrap();
/// // One degree of latitude is ~60 nm
/// assert!((distance_nm(a, b) - 60.04).abs() < 0.01);
/// ```
pub fn distance_nm(from: Coordinate, to: Coordinate) -> f64 {
    EARTH_RADIUS_NM * angular_distance(from, to)
}

/// Central angle between two positions in radians.
fn angular_distance(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat_rad();
    let lat2 = to.lat_rad();
    let dlat = lat2 - lat1;
    let dlon = to.lon_rad() - from.lon_rad();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing (forward azimuth) from one position to another.
///
/// Returns degrees true in [0, 360). Coincident points yield 0.
pub fn initial_bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat_rad();
    let lat2 = to.lat_rad();
    let dlon = to.lon_rad() - from.lon_rad();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    if y == 0.0 && x == 0.0 {
        return 0.0;
    }
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Bearing on arrival at `to` when following the great circle from `from`.
pub fn final_bearing(from: Coordinate, to: Coordinate) -> f64 {
    normalize_degrees(initial_bearing(to, from) + 180.0)
}

/// Project a position along a bearing for a given distance.
///
/// # Arguments
///
/// * `from` - Starting position
/// * `bearing_deg` - True bearing in degrees
/// * `distance_nm` - Distance to travel in nautical miles
///
/// # Returns
///
/// The destination point on the great circle.
pub fn destination(from: Coordinate, bearing_deg: f64, distance_nm: f64) -> Coordinate {
    let lat1 = from.lat_rad();
    let lon1 = from.lon_rad();
    let theta = bearing_deg.to_radians();
    let delta = distance_nm / EARTH_RADIUS_NM;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 =
        lon1 + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    Coordinate::from_radians(lat2, lon2)
}

/// Intermediate point at `fraction` (0.0 to 1.0) of the way along the great
/// circle from `from` to `to`.
pub fn interpolate(from: Coordinate, to: Coordinate, fraction: f64) -> Coordinate {
    let delta = angular_distance(from, to);
    if delta < COINCIDENT_RAD {
        return from;
    }
    if delta.sin().abs() < COINCIDENT_RAD {
        // Antipodal endpoints: any great circle works, so follow the initial bearing
        return destination(
            from,
            initial_bearing(from, to),
            fraction * delta * EARTH_RADIUS_NM,
        );
    }

    let a = ((1.0 - fraction) * delta).sin() / delta.sin();
    let b = (fraction * delta).sin() / delta.sin();

    let (lat1, lon1) = (from.lat_rad(), from.lon_rad());
    let (lat2, lon2) = (to.lat_rad(), to.lon_rad());

    let x = a * lat1.cos() * lon1.cos() + b * lat2.cos() * lon2.cos();
    let y = a * lat1.cos() * lon1.sin() + b * lat2.cos() * lon2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    Coordinate::from_radians(z.atan2((x * x + y * y).sqrt()), y.atan2(x))
}

/// Cross-track error of `position` relative to the great circle from
/// `start` to `end`.
///
/// A vessel right of track is told to steer left, and vice versa.
pub fn cross_track(start: Coordinate, end: Coordinate, position: Coordinate) -> CrossTrack {
    let d13 = angular_distance(start, position);
    let theta13 = initial_bearing(start, position).to_radians();
    let theta12 = initial_bearing(start, end).to_radians();

    let signed = (d13.sin() * (theta13 - theta12).sin()).asin() * EARTH_RADIUS_NM;
    CrossTrack {
        distance_nm: signed.abs(),
        steer: if signed > 0.0 {
            Steer::Left
        } else {
            Steer::Right
        },
    }
}

/// Signed smallest difference `to - from` between two angles, in (-180, 180].
pub fn angle_difference(from: f64, to: f64) -> f64 {
    let diff = normalize_degrees(to - from);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}
