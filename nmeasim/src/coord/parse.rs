//! Text parsing for coordinates.
//!
//! Accepts the forms found in hand-written scenario files:
//!
//! - decimal degrees: `37.6726`, `-122.369`
//! - degrees with hemisphere: `122 W`, `122° W`
//! - degrees and decimal minutes: `37° 40.3574' N`, `37 40.3574 N`
//! - degrees, minutes and seconds: `37° 40' 21.4" N`

use super::types::{Coordinate, CoordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

/// Parses a single latitude or longitude component into signed degrees.
///
/// South and West hemispheres produce negative values. A sign and a
/// hemisphere letter together are rejected.
pub fn parse_coordinate(text: &str) -> Result<f64, CoordError> {
    parse_component(text).map(|(value, _)| value)
}

/// Parses a `"<lat>, <lon>"` pair into a [`Coordinate`].
///
/// Hemisphere letters, when present, must match the component position:
/// `N`/`S` on the first half, `E`/`W` on the second.
pub fn parse_position(text: &str) -> Result<Coordinate, CoordError> {
    let unparseable = || CoordError::Unparseable(text.to_string());

    let (lat_text, lon_text) = text.split_once(',').ok_or_else(unparseable)?;
    let (lat, lat_axis) = parse_component(lat_text)?;
    let (lon, lon_axis) = parse_component(lon_text)?;

    if lat_axis == Some(Axis::Longitude) || lon_axis == Some(Axis::Latitude) {
        return Err(unparseable());
    }
    Coordinate::new(lat, lon)
}

fn parse_component(text: &str) -> Result<(f64, Option<Axis>), CoordError> {
    let unparseable = || CoordError::Unparseable(text.trim().to_string());

    let cleaned: String = text
        .chars()
        .map(|c| match c {
            '°' | '\'' | '"' | '′' | '″' => ' ',
            other => other,
        })
        .collect();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let hemisphere = split_hemisphere(&mut tokens);
    let (negate, axis) = match hemisphere {
        Some('N') => (false, Some(Axis::Latitude)),
        Some('S') => (true, Some(Axis::Latitude)),
        Some('E') => (false, Some(Axis::Longitude)),
        Some('W') => (true, Some(Axis::Longitude)),
        _ => (false, None),
    };

    let numbers = tokens
        .iter()
        .map(|t| t.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| unparseable())?;

    if axis.is_some() && tokens.first().is_some_and(|t| t.starts_with(['-', '+'])) {
        return Err(unparseable());
    }

    let value = match numbers.as_slice() {
        [deg] => *deg,
        [deg, min] => combine(*deg, *min, 0.0).ok_or_else(unparseable)?,
        [deg, min, sec] => combine(*deg, *min, *sec).ok_or_else(unparseable)?,
        _ => return Err(unparseable()),
    };
    if !value.is_finite() {
        return Err(unparseable());
    }

    Ok((if negate { -value } else { value }, axis))
}

/// Strips a trailing hemisphere letter, either standalone or glued to the
/// last number (`122W`).
fn split_hemisphere(tokens: &mut Vec<&str>) -> Option<char> {
    let last = tokens.pop()?;
    let mut chars = last.chars();
    let tail = chars.next_back().map(|c| c.to_ascii_uppercase());
    match tail {
        Some(h @ ('N' | 'S' | 'E' | 'W')) => {
            let rest = chars.as_str();
            if !rest.is_empty() {
                tokens.push(rest);
            }
            Some(h)
        }
        _ => {
            tokens.push(last);
            None
        }
    }
}

fn combine(deg: f64, min: f64, sec: f64) -> Option<f64> {
    if deg.fract() != 0.0 || !(0.0..60.0).contains(&min) || !(0.0..60.0).contains(&sec) {
        return None;
    }
    let magnitude = deg.abs() + min / 60.0 + sec / 3600.0;
    Some(if deg.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    })
}
