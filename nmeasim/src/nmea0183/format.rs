//! Field formatters shared by every sentence.
//!
//! Positions are written as `ddmm.mmm` / `dddmm.mmm` and numeric fields with
//! a fixed number of decimals. Rounding happens on integer thousandths of a
//! minute so a value never renders as `60.000` minutes.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::coord::Coordinate;
use crate::error::{finite, EncodeError};

/// Latitude as `ddmm.mmm,N`.
pub fn latitude(lat: f64) -> Result<String, EncodeError> {
    let lat = finite("latitude", lat)?;
    if lat.abs() > 90.0 {
        return Err(EncodeError::OutOfRange {
            field: "latitude",
            value: lat,
            reason: "must be within ±90°",
        });
    }
    let (deg, min_thousandths) = split_minutes(lat.abs());
    let hemisphere = if lat >= 0.0 { 'N' } else { 'S' };
    Ok(format!(
        "{:02}{:02}.{:03},{}",
        deg,
        min_thousandths / 1000,
        min_thousandths % 1000,
        hemisphere
    ))
}

/// Longitude as `dddmm.mmm,E`.
pub fn longitude(lon: f64) -> Result<String, EncodeError> {
    let lon = finite("longitude", lon)?;
    if lon.abs() > 180.0 {
        return Err(EncodeError::OutOfRange {
            field: "longitude",
            value: lon,
            reason: "must be within ±180°",
        });
    }
    let (deg, min_thousandths) = split_minutes(lon.abs());
    let hemisphere = if lon >= 0.0 { 'E' } else { 'W' };
    Ok(format!(
        "{:03}{:02}.{:03},{}",
        deg,
        min_thousandths / 1000,
        min_thousandths % 1000,
        hemisphere
    ))
}

/// Both position fields, `lat,N,lon,W`.
pub fn position(position: Coordinate) -> Result<String, EncodeError> {
    Ok(format!(
        "{},{}",
        latitude(position.lat())?,
        longitude(position.lon())?
    ))
}

/// Whole degrees and minutes in thousandths, with rounding carried into
/// the degrees.
fn split_minutes(abs_degrees: f64) -> (u32, u32) {
    let total = (abs_degrees * 60_000.0).round() as u64;
    ((total / 60_000) as u32, (total % 60_000) as u32)
}

/// UTC time of day as `hhmmss.00`.
pub fn time(at: &DateTime<Utc>) -> String {
    format!(
        "{:02}{:02}{:02}.{:02}",
        at.hour(),
        at.minute(),
        at.second(),
        at.timestamp_subsec_millis().min(999) / 10
    )
}

/// UTC date as `ddmmyy`.
pub fn date(at: &DateTime<Utc>) -> String {
    format!(
        "{:02}{:02}{:02}",
        at.day(),
        at.month(),
        at.year().rem_euclid(100)
    )
}

/// Fixed-point number with `decimals` places.
///
/// Negative zero renders as zero.
pub fn fixed(field: &'static str, value: f64, decimals: usize) -> Result<String, EncodeError> {
    let value = finite(field, value)?;
    let text = format!("{:.*}", decimals, value);
    Ok(match text.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => text,
    })
}

/// An angle in [0, 360) with one decimal.
///
/// Values that round up to 360.0 wrap to 0.0.
pub fn angle(field: &'static str, degrees: f64) -> Result<String, EncodeError> {
    let degrees = finite(field, degrees)?.rem_euclid(360.0);
    let tenths = (degrees * 10.0).round() as u32 % 3600;
    Ok(format!("{}.{}", tenths / 10, tenths % 10))
}

/// Magnetic variation as `v.v,E` or `v.v,W` (east positive).
pub fn variation(variation: f64) -> Result<String, EncodeError> {
    let variation = finite("magnetic_variation", variation)?;
    let direction = if variation >= 0.0 { 'E' } else { 'W' };
    Ok(format!("{},{}", fixed("magnetic_variation", variation.abs(), 1)?, direction))
}
