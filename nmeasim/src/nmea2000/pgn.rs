//! Catalog of the parameter groups the simulator can produce.

use std::fmt;

use crate::config::ConfigError;

/// Supported NMEA 2000 parameter group numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pgn {
    SystemTime,
    Rudder,
    VesselHeading,
    Speed,
    WaterDepth,
    AisClassAPosition,
    PositionRapid,
    CogSogRapid,
    GnssPosition,
    CrossTrackError,
    NavigationData,
    AisClassAStatic,
    WindData,
}

impl Pgn {
    /// Every PGN, in the order emitted within a tick.
    pub const ALL: [Pgn; 13] = [
        Pgn::SystemTime,
        Pgn::Rudder,
        Pgn::VesselHeading,
        Pgn::Speed,
        Pgn::WaterDepth,
        Pgn::PositionRapid,
        Pgn::CogSogRapid,
        Pgn::GnssPosition,
        Pgn::CrossTrackError,
        Pgn::NavigationData,
        Pgn::WindData,
        Pgn::AisClassAPosition,
        Pgn::AisClassAStatic,
    ];

    /// PGNs describing own ship, emitted by default.
    pub const OWN_SHIP: [Pgn; 11] = [
        Pgn::SystemTime,
        Pgn::Rudder,
        Pgn::VesselHeading,
        Pgn::Speed,
        Pgn::WaterDepth,
        Pgn::PositionRapid,
        Pgn::CogSogRapid,
        Pgn::GnssPosition,
        Pgn::CrossTrackError,
        Pgn::NavigationData,
        Pgn::WindData,
    ];

    pub fn number(&self) -> u32 {
        match self {
            Pgn::SystemTime => 126992,
            Pgn::Rudder => 127245,
            Pgn::VesselHeading => 127250,
            Pgn::Speed => 128259,
            Pgn::WaterDepth => 128267,
            Pgn::AisClassAPosition => 129038,
            Pgn::PositionRapid => 129025,
            Pgn::CogSogRapid => 129026,
            Pgn::GnssPosition => 129029,
            Pgn::CrossTrackError => 129283,
            Pgn::NavigationData => 129284,
            Pgn::AisClassAStatic => 129794,
            Pgn::WindData => 130306,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pgn::SystemTime => "System Time",
            Pgn::Rudder => "Rudder",
            Pgn::VesselHeading => "Vessel Heading",
            Pgn::Speed => "Speed",
            Pgn::WaterDepth => "Water Depth",
            Pgn::AisClassAPosition => "AIS Class A Position Report",
            Pgn::PositionRapid => "Position, Rapid Update",
            Pgn::CogSogRapid => "COG & SOG, Rapid Update",
            Pgn::GnssPosition => "GNSS Position Data",
            Pgn::CrossTrackError => "Cross Track Error",
            Pgn::NavigationData => "Navigation Data",
            Pgn::AisClassAStatic => "AIS Class A Static and Voyage Related Data",
            Pgn::WindData => "Wind Data",
        }
    }

    /// Default CAN priority (0 highest, 7 lowest).
    pub fn priority(&self) -> u8 {
        match self {
            Pgn::Rudder
            | Pgn::VesselHeading
            | Pgn::Speed
            | Pgn::PositionRapid
            | Pgn::CogSogRapid
            | Pgn::WindData => 2,
            Pgn::SystemTime
            | Pgn::WaterDepth
            | Pgn::GnssPosition
            | Pgn::CrossTrackError
            | Pgn::NavigationData => 3,
            Pgn::AisClassAPosition => 4,
            Pgn::AisClassAStatic => 6,
        }
    }

    /// Payload length in bytes.
    pub fn length(&self) -> usize {
        match self {
            Pgn::GnssPosition => 43,
            Pgn::NavigationData => 34,
            Pgn::AisClassAPosition => 28,
            Pgn::AisClassAStatic => 75,
            _ => 8,
        }
    }

    /// True if the payload is carried by the fast-packet protocol.
    pub fn is_fast_packet(&self) -> bool {
        self.length() > 8
    }

    /// True for PGNs describing other vessels.
    pub fn is_ais(&self) -> bool {
        matches!(self, Pgn::AisClassAPosition | Pgn::AisClassAStatic)
    }
}

impl TryFrom<u32> for Pgn {
    type Error = ConfigError;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        Pgn::ALL
            .into_iter()
            .find(|pgn| pgn.number() == number)
            .ok_or(ConfigError::UnsupportedPgn(number))
    }
}

impl fmt::Display for Pgn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}
