//! AIS message types 1 (position report) and 5 (static and voyage data).
//!
//! Each message converts to and from its bit layout. Physical values are
//! quantized on encode, so a decoded message matches the original only to
//! within the field resolution.

use chrono::{DateTime, Timelike, Utc};

use super::bits::Bits;
use crate::coord::Coordinate;
use crate::error::{finite, EncodeError};
use crate::vessel::{NavigationStatus, ShipType, VesselIdentity, VesselState};

/// Length of a type 1 message in bits.
pub const POSITION_REPORT_BITS: usize = 168;

/// Length of a type 5 message in bits.
pub const STATIC_VOYAGE_BITS: usize = 424;

const LON_NOT_AVAILABLE: i64 = 181 * 600_000;
const LAT_NOT_AVAILABLE: i64 = 91 * 600_000;
const SOG_NOT_AVAILABLE: u64 = 1023;
const COG_NOT_AVAILABLE: u64 = 3600;
const HEADING_NOT_AVAILABLE: u64 = 511;
const ROT_NOT_AVAILABLE: i64 = -128;
const ROT_MAX: f64 = 126.0;
const ROT_FACTOR: f64 = 4.733;

/// Electronic position fixing device type: GPS.
const EPFD_GPS: u64 = 1;

/// Class A position report, message type 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub mmsi: u32,
    pub navigation_status: NavigationStatus,
    /// Degrees per minute, positive to starboard.
    pub rate_of_turn: Option<f64>,
    pub speed_knots: Option<f64>,
    /// True for DGPS-quality (< 10 m) accuracy.
    pub high_accuracy: bool,
    pub position: Option<Coordinate>,
    pub course: Option<f64>,
    pub heading: Option<f64>,
    /// UTC second of the fix.
    pub timestamp: u8,
}

impl PositionReport {
    pub const MESSAGE_TYPE: u8 = 1;

    /// Report for a vessel's state at `at`.
    pub fn from_state(identity: &VesselIdentity, state: &VesselState, at: &DateTime<Utc>) -> Self {
        Self {
            mmsi: identity.mmsi.value(),
            navigation_status: state.navigation_status,
            rate_of_turn: state.rate_of_turn,
            speed_knots: Some(state.speed_knots),
            high_accuracy: false,
            position: Some(state.position),
            course: Some(state.course_over_ground),
            heading: Some(state.heading),
            timestamp: at.second().min(59) as u8,
        }
    }

    /// Pack into the 168-bit layout.
    pub fn encode(&self) -> Result<Bits, EncodeError> {
        let mut bits = Bits::with_capacity(POSITION_REPORT_BITS);
        bits.push_unsigned(u64::from(Self::MESSAGE_TYPE), 6);
        bits.push_unsigned(0, 2); // repeat indicator
        bits.push_unsigned(u64::from(self.mmsi), 30);
        bits.push_unsigned(u64::from(self.navigation_status.code()), 4);
        bits.push_signed(encode_rot(self.rate_of_turn)?, 8);
        bits.push_unsigned(encode_sog(self.speed_knots)?, 10);
        bits.push_bit(self.high_accuracy);

        let (lon, lat) = match self.position {
            Some(p) => (
                (p.lon() * 600_000.0).round() as i64,
                (p.lat() * 600_000.0).round() as i64,
            ),
            None => (LON_NOT_AVAILABLE, LAT_NOT_AVAILABLE),
        };
        bits.push_signed(lon, 28);
        bits.push_signed(lat, 27);

        bits.push_unsigned(encode_cog(self.course)?, 12);
        bits.push_unsigned(encode_heading(self.heading)?, 9);
        bits.push_unsigned(u64::from(self.timestamp.min(63)), 6);
        bits.push_unsigned(0, 2); // maneuver indicator
        bits.push_unsigned(0, 3); // spare
        bits.push_bit(false); // RAIM
        bits.push_unsigned(0, 19); // radio status
        debug_assert_eq!(bits.len(), POSITION_REPORT_BITS);
        Ok(bits)
    }

    /// Unpack a type 1, 2 or 3 payload.
    pub fn decode(bits: &Bits) -> Option<Self> {
        if bits.len() < POSITION_REPORT_BITS {
            return None;
        }
        let mut r = bits.reader();
        let message_type = r.read_unsigned(6)?;
        if !(1..=3).contains(&message_type) {
            return None;
        }
        r.skip(2)?;
        let mmsi = r.read_unsigned(30)? as u32;
        let navigation_status = NavigationStatus::from_code(r.read_unsigned(4)? as u8);

        let rot_raw = r.read_signed(8)?;
        let rate_of_turn = (rot_raw != ROT_NOT_AVAILABLE).then(|| {
            let magnitude = (rot_raw.abs() as f64 / ROT_FACTOR).powi(2);
            magnitude.copysign(rot_raw as f64)
        });

        let sog = r.read_unsigned(10)?;
        let speed_knots = (sog != SOG_NOT_AVAILABLE).then(|| sog as f64 / 10.0);
        let high_accuracy = r.read_bit()?;

        let lon = r.read_signed(28)?;
        let lat = r.read_signed(27)?;
        let position = if lon == LON_NOT_AVAILABLE || lat == LAT_NOT_AVAILABLE {
            None
        } else {
            Coordinate::new(lat as f64 / 600_000.0, lon as f64 / 600_000.0).ok()
        };

        let cog = r.read_unsigned(12)?;
        let course = (cog < COG_NOT_AVAILABLE).then(|| cog as f64 / 10.0);
        let hdg = r.read_unsigned(9)?;
        let heading = (hdg != HEADING_NOT_AVAILABLE).then_some(hdg as f64);
        let timestamp = r.read_unsigned(6)? as u8;

        Some(Self {
            mmsi,
            navigation_status,
            rate_of_turn,
            speed_knots,
            high_accuracy,
            position,
            course,
            heading,
            timestamp,
        })
    }
}

/// Estimated time of arrival, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eta {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

/// Static and voyage related data, message type 5.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticVoyage {
    pub mmsi: u32,
    pub imo: u32,
    pub call_sign: String,
    pub name: String,
    pub ship_type: ShipType,
    pub to_bow: u16,
    pub to_stern: u16,
    pub to_port: u8,
    pub to_starboard: u8,
    pub eta: Option<Eta>,
    /// Meters, 0.1 m resolution.
    pub draught_m: f64,
    pub destination: String,
}

impl StaticVoyage {
    pub const MESSAGE_TYPE: u8 = 5;

    /// Static report for `identity`.
    ///
    /// Dimensions are rounded to whole meters and clamped to the field
    /// widths.
    pub fn from_identity(identity: &VesselIdentity) -> Self {
        let dims = &identity.dimensions;
        Self {
            mmsi: identity.mmsi.value(),
            imo: identity.imo.unwrap_or(0),
            call_sign: identity.call_sign.clone(),
            name: identity.name.clone(),
            ship_type: identity.ship_type,
            to_bow: clamp_meters(dims.to_bow, 511) as u16,
            to_stern: clamp_meters(dims.to_stern, 511) as u16,
            to_port: clamp_meters(dims.to_port, 63) as u8,
            to_starboard: clamp_meters(dims.to_starboard, 63) as u8,
            eta: None,
            draught_m: identity.draft_m.unwrap_or(0.0),
            destination: identity.destination.clone(),
        }
    }

    /// Pack into the 424-bit layout.
    pub fn encode(&self) -> Result<Bits, EncodeError> {
        let mut bits = Bits::with_capacity(STATIC_VOYAGE_BITS);
        bits.push_unsigned(u64::from(Self::MESSAGE_TYPE), 6);
        bits.push_unsigned(0, 2); // repeat indicator
        bits.push_unsigned(u64::from(self.mmsi), 30);
        bits.push_unsigned(0, 2); // AIS version
        bits.push_unsigned(u64::from(self.imo), 30);
        bits.push_text("call_sign", &self.call_sign, 7)?;
        bits.push_text("name", &self.name, 20)?;
        bits.push_unsigned(u64::from(self.ship_type.code()), 8);
        bits.push_unsigned(u64::from(self.to_bow.min(511)), 9);
        bits.push_unsigned(u64::from(self.to_stern.min(511)), 9);
        bits.push_unsigned(u64::from(self.to_port.min(63)), 6);
        bits.push_unsigned(u64::from(self.to_starboard.min(63)), 6);
        bits.push_unsigned(EPFD_GPS, 4);

        let eta = self.eta.unwrap_or(Eta {
            month: 0,
            day: 0,
            hour: 24,
            minute: 60,
        });
        bits.push_unsigned(u64::from(eta.month), 4);
        bits.push_unsigned(u64::from(eta.day), 5);
        bits.push_unsigned(u64::from(eta.hour), 5);
        bits.push_unsigned(u64::from(eta.minute), 6);

        let draught = finite("draught", self.draught_m)?;
        if draught < 0.0 {
            return Err(EncodeError::OutOfRange {
                field: "draught",
                value: draught,
                reason: "must not be negative",
            });
        }
        bits.push_unsigned(((draught * 10.0).round() as u64).min(255), 8);
        bits.push_text("destination", &self.destination, 20)?;
        bits.push_bit(false); // DTE ready
        bits.push_bit(false); // spare
        debug_assert_eq!(bits.len(), STATIC_VOYAGE_BITS);
        Ok(bits)
    }

    /// Unpack a type 5 payload.
    pub fn decode(bits: &Bits) -> Option<Self> {
        if bits.len() < STATIC_VOYAGE_BITS {
            return None;
        }
        let mut r = bits.reader();
        if r.read_unsigned(6)? != u64::from(Self::MESSAGE_TYPE) {
            return None;
        }
        r.skip(2)?;
        let mmsi = r.read_unsigned(30)? as u32;
        r.skip(2)?;
        let imo = r.read_unsigned(30)? as u32;
        let call_sign = r.read_text(7)?;
        let name = r.read_text(20)?;
        let ship_type = ShipType::from_code(r.read_unsigned(8)? as u8);
        let to_bow = r.read_unsigned(9)? as u16;
        let to_stern = r.read_unsigned(9)? as u16;
        let to_port = r.read_unsigned(6)? as u8;
        let to_starboard = r.read_unsigned(6)? as u8;
        r.skip(4)?;
        let eta = Eta {
            month: r.read_unsigned(4)? as u8,
            day: r.read_unsigned(5)? as u8,
            hour: r.read_unsigned(5)? as u8,
            minute: r.read_unsigned(6)? as u8,
        };
        let draught_m = r.read_unsigned(8)? as f64 / 10.0;
        let destination = r.read_text(20)?;

        Some(Self {
            mmsi,
            imo,
            call_sign,
            name,
            ship_type,
            to_bow,
            to_stern,
            to_port,
            to_starboard,
            eta: (eta.month != 0).then_some(eta),
            draught_m,
            destination,
        })
    }
}

fn clamp_meters(value: f64, max: u32) -> u32 {
    if value.is_finite() && value > 0.0 {
        (value.round() as u32).min(max)
    } else {
        0
    }
}

/// AIS ROT indicator: 4.733·√|rot| rounded, capped at ±126.
fn encode_rot(rot: Option<f64>) -> Result<i64, EncodeError> {
    let Some(rot) = rot else {
        return Ok(ROT_NOT_AVAILABLE);
    };
    let rot = finite("rate_of_turn", rot)?;
    let indicator = (ROT_FACTOR * rot.abs().sqrt()).round().min(ROT_MAX);
    Ok(indicator.copysign(rot) as i64)
}

fn encode_sog(speed: Option<f64>) -> Result<u64, EncodeError> {
    let Some(speed) = speed else {
        return Ok(SOG_NOT_AVAILABLE);
    };
    let speed = finite("speed_over_ground", speed)?;
    if speed < 0.0 {
        return Err(EncodeError::OutOfRange {
            field: "speed_over_ground",
            value: speed,
            reason: "must not be negative",
        });
    }
    // 1022 means 102.2 kn or faster
    Ok(((speed * 10.0).round() as u64).min(1022))
}

fn encode_cog(course: Option<f64>) -> Result<u64, EncodeError> {
    match course {
        Some(c) => Ok(((finite("course_over_ground", c)?.rem_euclid(360.0) * 10.0).round()
            as u64)
            % 3600),
        None => Ok(COG_NOT_AVAILABLE),
    }
}

fn encode_heading(heading: Option<f64>) -> Result<u64, EncodeError> {
    match heading {
        Some(h) => Ok((finite("heading", h)?.rem_euclid(360.0).round() as u64) % 360),
        None => Ok(HEADING_NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessel::Mmsi;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn report() -> PositionReport {
        PositionReport {
            mmsi: 366_123_456,
            navigation_status: NavigationStatus::UnderwayUsingEngine,
            rate_of_turn: Some(10.0),
            speed_knots: Some(12.3),
            high_accuracy: false,
            position: Some(Coordinate::new(37.8, -122.4).unwrap()),
            course: Some(45.1),
            heading: Some(45.0),
            timestamp: 30,
        }
    }

    #[test]
    fn test_position_report_length_and_type() {
        let bits = report().encode().unwrap();
        assert_eq!(bits.len(), POSITION_REPORT_BITS);
        assert_eq!(bits.reader().read_unsigned(6), Some(1));
    }

    #[test]
    fn test_position_report_decode() {
        let decoded = PositionReport::decode(&report().encode().unwrap()).unwrap();
        assert_eq!(decoded.mmsi, 366_123_456);
        assert_eq!(decoded.navigation_status, NavigationStatus::UnderwayUsingEngine);
        assert_eq!(decoded.speed_knots, Some(12.3));
        assert_eq!(decoded.course, Some(45.1));
        assert_eq!(decoded.heading, Some(45.0));
        assert_eq!(decoded.timestamp, 30);
        let p = decoded.position.unwrap();
        assert!((p.lat() - 37.8).abs() < 1e-6);
        assert!((p.lon() + 122.4).abs() < 1e-6);
        // 4.733 * sqrt(10) = 14.97 -> 15 -> (15 / 4.733)^2
        let rot = decoded.rate_of_turn.unwrap();
        assert!((rot - 10.04).abs() < 0.01, "rot = {}", rot);
    }

    #[test]
    fn test_not_available_markers() {
        let bits = PositionReport {
            rate_of_turn: None,
            speed_knots: None,
            position: None,
            course: None,
            heading: None,
            ..report()
        }
        .encode()
        .unwrap();
        let decoded = PositionReport::decode(&bits).unwrap();
        assert_eq!(decoded.rate_of_turn, None);
        assert_eq!(decoded.speed_knots, None);
        assert_eq!(decoded.position, None);
        assert_eq!(decoded.course, None);
        assert_eq!(decoded.heading, None);
    }

    #[test]
    fn test_rot_indicator() {
        assert_eq!(encode_rot(None).unwrap(), -128);
        assert_eq!(encode_rot(Some(0.0)).unwrap(), 0);
        assert_eq!(encode_rot(Some(-4.0)).unwrap(), -9);
        assert_eq!(encode_rot(Some(10_000.0)).unwrap(), 126);
        assert_eq!(encode_rot(Some(-10_000.0)).unwrap(), -126);
        assert!(encode_rot(Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_sog_and_cog_limits() {
        assert_eq!(encode_sog(Some(200.0)).unwrap(), 1022);
        assert!(encode_sog(Some(-1.0)).is_err());
        assert_eq!(encode_cog(Some(359.97)).unwrap(), 0);
        assert_eq!(encode_heading(Some(359.6)).unwrap(), 0);
    }

    #[test]
    fn test_from_state_uses_utc_second() {
        let identity = VesselIdentity::new(
            Mmsi::new(366_000_001).unwrap(),
            "PACIFIC TRADER",
            ShipType::Cargo,
        )
        .unwrap();
        let state = VesselState::at_rest(
            Coordinate::new(37.8, -122.4).unwrap(),
            90.0,
            NavigationStatus::AtAnchor,
        );
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 42).unwrap();
        let report = PositionReport::from_state(&identity, &state, &at);
        assert_eq!(report.timestamp, 42);
        assert_eq!(report.mmsi, 366_000_001);
        assert_eq!(report.navigation_status, NavigationStatus::AtAnchor);
    }

    #[test]
    fn test_static_voyage_roundtrip() {
        let identity = VesselIdentity::new(
            Mmsi::new(366_123_456).unwrap(),
            "Pacific Trader",
            ShipType::Cargo,
        )
        .unwrap()
        .with_draft(8.5)
        .unwrap()
        .with_destination("oakland")
        .with_imo(9_123_456);

        let message = StaticVoyage::from_identity(&identity);
        let bits = message.encode().unwrap();
        assert_eq!(bits.len(), STATIC_VOYAGE_BITS);

        let decoded = StaticVoyage::decode(&bits).unwrap();
        assert_eq!(decoded.mmsi, 366_123_456);
        assert_eq!(decoded.imo, 9_123_456);
        assert_eq!(decoded.name, "PACIFIC TRADER");
        assert_eq!(decoded.call_sign, "V123456");
        assert_eq!(decoded.destination, "OAKLAND");
        assert_eq!(decoded.ship_type, ShipType::Cargo);
        assert_eq!(decoded.draught_m, 8.5);
        assert_eq!(decoded.eta, None);
        assert_eq!(
            u32::from(decoded.to_bow) + u32::from(decoded.to_stern),
            200
        );
        assert_eq!(
            u32::from(decoded.to_port) + u32::from(decoded.to_starboard),
            30
        );
    }

    #[test]
    fn test_static_voyage_rejects_long_destination() {
        let mut message = StaticVoyage::from_identity(
            &VesselIdentity::new(Mmsi::new(366_123_456).unwrap(), "X", ShipType::Tug).unwrap(),
        );
        message.destination = "A DESTINATION FAR TOO LONG".to_string();
        assert!(matches!(
            message.encode(),
            Err(EncodeError::TextTooLong {
                field: "destination",
                ..
            })
        ));
    }

    proptest! {
        #[test]
        fn prop_position_report_roundtrip(
            lat in -89.9f64..89.9,
            lon in -179.9f64..179.9,
            sog in 0.0f64..100.0,
            cog in 0.0f64..359.9,
            mmsi in 200_000_000u32..800_000_000,
        ) {
            let original = PositionReport {
                mmsi,
                position: Some(Coordinate::new(lat, lon).unwrap()),
                speed_knots: Some(sog),
                course: Some(cog),
                ..report()
            };
            let decoded = PositionReport::decode(&original.encode().unwrap()).unwrap();
            let p = decoded.position.unwrap();
            prop_assert_eq!(decoded.mmsi, mmsi);
            prop_assert!((p.lat() - lat).abs() <= 1.0 / 1_200_000.0 + 1e-9);
            prop_assert!((p.lon() - lon).abs() <= 1.0 / 1_200_000.0 + 1e-9);
            prop_assert!((decoded.speed_knots.unwrap() - sog).abs() <= 0.05 + 1e-9);
            prop_assert!((decoded.course.unwrap() - cog).abs() <= 0.05 + 1e-9);
        }
    }
}
