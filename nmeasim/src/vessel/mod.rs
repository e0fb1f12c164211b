//! Simulated vessels.
//!
//! - [`VesselIdentity`] - Static data broadcast by AIS type 5 / PGN 129794
//! - [`VesselState`] - Kinematic snapshot produced every tick
//! - [`VesselModel`] - Owns identity, motion source and state
//! - [`Helm`] - Rudder response to heading changes

mod identity;
mod model;
mod state;
mod steering;

pub use identity::{
    Dimensions, Mmsi, NavigationStatus, ShipType, VesselIdentity, MAX_CALL_SIGN_LEN,
    MAX_DRAFT_M, MAX_NAME_LEN,
};
pub use model::{Motion, VesselModel, MAX_DEAD_RECKONING_STEP};
pub use state::{VesselState, KNOTS_TO_MPS};
pub use steering::{Helm, MAX_RUDDER_ANGLE, RUDDER_GAIN, RUDDER_RATE};
