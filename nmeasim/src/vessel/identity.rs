//! Static vessel identity: MMSI, name, type and dimensions.
//!
//! - [`Mmsi`] - Validated 9-digit Maritime Mobile Service Identity
//! - [`ShipType`] - AIS ship-and-cargo category
//! - [`NavigationStatus`] - AIS navigational status
//! - [`Dimensions`] - Hull size relative to the GNSS antenna
//! - [`VesselIdentity`] - Everything that does not change during a run

use std::fmt;

use crate::config::ConfigError;

/// Maximum vessel name length carried by AIS.
pub const MAX_NAME_LEN: usize = 20;

/// Maximum call sign length carried by AIS.
pub const MAX_CALL_SIGN_LEN: usize = 7;

/// Largest draught AIS type 5 can express (255 × 0.1 m).
pub const MAX_DRAFT_M: f64 = 25.5;

/// Maritime Mobile Service Identity.
///
/// Always exactly nine decimal digits (100000000..=999999999).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mmsi(u32);

impl Mmsi {
    /// Validate and wrap a raw MMSI.
    pub fn new(raw: u64) -> Result<Self, ConfigError> {
        if (100_000_000..=999_999_999).contains(&raw) {
            Ok(Self(raw as u32))
        } else {
            Err(ConfigError::InvalidMmsi(raw))
        }
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

/// AIS ship-and-cargo type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipType {
    Fishing,
    Dredger,
    Sailing,
    Pilot,
    Tug,
    Passenger,
    Ferry,
    Cargo,
    Tanker,
    /// Any other code from the ITU table.
    Other(u8),
}

impl ShipType {
    /// The ITU-R M.1371 type code.
    pub fn code(&self) -> u8 {
        match self {
            ShipType::Fishing => 30,
            ShipType::Dredger => 33,
            ShipType::Sailing => 36,
            ShipType::Pilot => 50,
            ShipType::Tug => 52,
            ShipType::Passenger => 60,
            ShipType::Ferry => 61,
            ShipType::Cargo => 70,
            ShipType::Tanker => 80,
            ShipType::Other(code) => *code,
        }
    }

    /// Map a type code back to a named variant where one exists.
    pub fn from_code(code: u8) -> Self {
        match code {
            30 => ShipType::Fishing,
            33 => ShipType::Dredger,
            36 => ShipType::Sailing,
            50 => ShipType::Pilot,
            52 => ShipType::Tug,
            60 => ShipType::Passenger,
            61 => ShipType::Ferry,
            70 => ShipType::Cargo,
            80 => ShipType::Tanker,
            other => ShipType::Other(other),
        }
    }

    /// Parse a case-insensitive name such as `"cargo"` or `"sailing"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let ship_type = match name.trim().to_ascii_lowercase().as_str() {
            "fishing" => ShipType::Fishing,
            "dredger" => ShipType::Dredger,
            "sailing" => ShipType::Sailing,
            "pilot" => ShipType::Pilot,
            "tug" => ShipType::Tug,
            "passenger" => ShipType::Passenger,
            "ferry" => ShipType::Ferry,
            "cargo" => ShipType::Cargo,
            "tanker" => ShipType::Tanker,
            _ => return None,
        };
        Some(ship_type)
    }

    /// Typical hull size for this kind of vessel.
    pub fn default_dimensions(&self) -> Dimensions {
        match self {
            ShipType::Sailing => Dimensions::from_hull(15.0, 4.0),
            ShipType::Fishing => Dimensions::from_hull(25.0, 8.0),
            _ => Dimensions::from_hull(200.0, 30.0),
        }
    }

    /// Typical draught in meters for this kind of vessel.
    pub fn default_draft_m(&self) -> f64 {
        match self {
            ShipType::Sailing => 2.1,
            ShipType::Fishing => 3.5,
            _ => 12.0,
        }
    }
}

/// AIS navigational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationStatus {
    #[default]
    UnderwayUsingEngine,
    AtAnchor,
    NotUnderCommand,
    RestrictedManoeuvrability,
    ConstrainedByDraught,
    Moored,
    Aground,
    EngagedInFishing,
    UnderwaySailing,
    NotDefined,
}

impl NavigationStatus {
    /// The 4-bit AIS code.
    pub fn code(&self) -> u8 {
        match self {
            NavigationStatus::UnderwayUsingEngine => 0,
            NavigationStatus::AtAnchor => 1,
            NavigationStatus::NotUnderCommand => 2,
            NavigationStatus::RestrictedManoeuvrability => 3,
            NavigationStatus::ConstrainedByDraught => 4,
            NavigationStatus::Moored => 5,
            NavigationStatus::Aground => 6,
            NavigationStatus::EngagedInFishing => 7,
            NavigationStatus::UnderwaySailing => 8,
            NavigationStatus::NotDefined => 15,
        }
    }

    /// Decode a 4-bit AIS code. Reserved codes map to `NotDefined`.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => NavigationStatus::UnderwayUsingEngine,
            1 => NavigationStatus::AtAnchor,
            2 => NavigationStatus::NotUnderCommand,
            3 => NavigationStatus::RestrictedManoeuvrability,
            4 => NavigationStatus::ConstrainedByDraught,
            5 => NavigationStatus::Moored,
            6 => NavigationStatus::Aground,
            7 => NavigationStatus::EngagedInFishing,
            8 => NavigationStatus::UnderwaySailing,
            _ => NavigationStatus::NotDefined,
        }
    }

    /// Parse a snake_case name such as `"at_anchor"` or `"underway_engine"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let status = match name.trim().to_ascii_lowercase().as_str() {
            "underway_engine" | "underway_using_engine" => NavigationStatus::UnderwayUsingEngine,
            "at_anchor" | "anchored" => NavigationStatus::AtAnchor,
            "not_under_command" => NavigationStatus::NotUnderCommand,
            "restricted_manoeuvrability" | "restricted_maneuverability" | "restricted_maneuver" => {
                NavigationStatus::RestrictedManoeuvrability
            }
            "constrained_by_draught" | "constrained_by_draft" | "constrained_draft" => {
                NavigationStatus::ConstrainedByDraught
            }
            "moored" => NavigationStatus::Moored,
            "aground" => NavigationStatus::Aground,
            "fishing" | "engaged_in_fishing" => NavigationStatus::EngagedInFishing,
            "underway_sailing" | "sailing" => NavigationStatus::UnderwaySailing,
            "not_defined" => NavigationStatus::NotDefined,
            _ => return None,
        };
        Some(status)
    }

    /// Statuses that describe a deliberately stationary vessel.
    pub fn is_stationary(&self) -> bool {
        matches!(
            self,
            NavigationStatus::AtAnchor | NavigationStatus::Moored | NavigationStatus::Aground
        )
    }

    /// Statuses that the speed-based update is allowed to overwrite.
    fn is_automatic(&self) -> bool {
        matches!(
            self,
            NavigationStatus::UnderwayUsingEngine
                | NavigationStatus::UnderwaySailing
                | NavigationStatus::AtAnchor
        )
    }

    /// Status implied by the current speed.
    ///
    /// A vessel slower than 0.1 kn is anchored unless it is already moored
    /// or aground. A moving vessel is underway, under sail for sailing
    /// types and under engine otherwise. Special statuses such as "engaged
    /// in fishing" are never overwritten.
    pub fn for_speed(current: Self, speed_knots: f64, ship_type: ShipType) -> Self {
        if speed_knots < 0.1 {
            if current.is_stationary() || !current.is_automatic() {
                current
            } else {
                NavigationStatus::AtAnchor
            }
        } else if current.is_automatic() {
            if ship_type == ShipType::Sailing {
                NavigationStatus::UnderwaySailing
            } else {
                NavigationStatus::UnderwayUsingEngine
            }
        } else {
            current
        }
    }
}

/// Hull dimensions in meters relative to the position reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub to_bow: f64,
    pub to_stern: f64,
    pub to_port: f64,
    pub to_starboard: f64,
}

impl Dimensions {
    /// Antenna at the hull's center.
    pub fn from_hull(length: f64, beam: f64) -> Self {
        Self {
            to_bow: length / 2.0,
            to_stern: length / 2.0,
            to_port: beam / 2.0,
            to_starboard: beam / 2.0,
        }
    }

    pub fn length(&self) -> f64 {
        self.to_bow + self.to_stern
    }

    pub fn beam(&self) -> f64 {
        self.to_port + self.to_starboard
    }
}

/// Immutable identity of one simulated vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselIdentity {
    pub mmsi: Mmsi,
    /// Upper-case name, at most [`MAX_NAME_LEN`] characters.
    pub name: String,
    pub call_sign: String,
    pub ship_type: ShipType,
    pub dimensions: Dimensions,
    /// Static draught in meters, capped at [`MAX_DRAFT_M`].
    pub draft_m: Option<f64>,
    pub imo: Option<u32>,
    pub destination: String,
}

impl VesselIdentity {
    /// Build an identity with type-derived defaults for everything else.
    ///
    /// # Errors
    ///
    /// Rejects names longer than [`MAX_NAME_LEN`] characters.
    pub fn new(mmsi: Mmsi, name: &str, ship_type: ShipType) -> Result<Self, ConfigError> {
        let name = name.trim().to_ascii_uppercase();
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ConfigError::invalid(
                "name",
                &name,
                format!("must be at most {} characters", MAX_NAME_LEN),
            ));
        }

        Ok(Self {
            mmsi,
            call_sign: default_call_sign(mmsi),
            name,
            ship_type,
            dimensions: ship_type.default_dimensions(),
            draft_m: Some(ship_type.default_draft_m()),
            imo: None,
            destination: String::new(),
        })
    }

    /// Override the call sign.
    pub fn with_call_sign(mut self, call_sign: &str) -> Result<Self, ConfigError> {
        let call_sign = call_sign.trim().to_ascii_uppercase();
        if call_sign.chars().count() > MAX_CALL_SIGN_LEN {
            return Err(ConfigError::invalid(
                "call_sign",
                &call_sign,
                format!("must be at most {} characters", MAX_CALL_SIGN_LEN),
            ));
        }
        self.call_sign = call_sign;
        Ok(self)
    }

    /// Override the draught. Values above [`MAX_DRAFT_M`] are capped.
    pub fn with_draft(mut self, draft_m: f64) -> Result<Self, ConfigError> {
        if !draft_m.is_finite() || draft_m < 0.0 {
            return Err(ConfigError::invalid(
                "draft",
                draft_m,
                "must be a non-negative number",
            ));
        }
        self.draft_m = Some(draft_m.min(MAX_DRAFT_M));
        Ok(self)
    }

    pub fn with_destination(mut self, destination: &str) -> Self {
        self.destination = destination.trim().to_ascii_uppercase();
        self
    }

    pub fn with_imo(mut self, imo: u32) -> Self {
        self.imo = Some(imo);
        self
    }
}

/// `V` followed by the last six MMSI digits.
fn default_call_sign(mmsi: Mmsi) -> String {
    format!("V{:06}", mmsi.value() % 1_000_000)
}
