//! AIS binary identification messages carried in `!AIVDM` sentences.
//!
//! ```text
//! VesselIdentity + VesselState
//!          │
//!          ▼
//!   PositionReport / StaticVoyage ──encode──► Bits (MSB first)
//!                                               │
//!                                             armor (6-bit ASCII + fill)
//!                                               │
//!                                             Framer (≤ 60 chars/fragment,
//!                                               │     seq id, channel A/B)
//!                                               ▼
//!                                  !AIVDM,n,i,s,c,payload,fill*hh
//! ```
//!
//! The decoding half ([`dearmor`], [`Fragment`], [`reassemble`] and the
//! message `decode` functions) exists to verify what the encoder produces.

mod armor;
mod bits;
mod fragment;
mod messages;

use chrono::{DateTime, Utc};

pub use armor::{armor, dearmor, Armored};
pub use bits::{BitReader, Bits};
pub use fragment::{reassemble, Channel, Fragment, Framer, MAX_FRAGMENT_PAYLOAD};
pub use messages::{
    Eta, PositionReport, StaticVoyage, POSITION_REPORT_BITS, STATIC_VOYAGE_BITS,
};

use crate::error::EncodeError;
use crate::vessel::{VesselIdentity, VesselState};

/// Which AIS message a set of sentences carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AisMessageType {
    /// Type 1
    PositionReport,
    /// Type 5
    StaticVoyage,
}

impl AisMessageType {
    pub fn code(&self) -> u8 {
        match self {
            AisMessageType::PositionReport => PositionReport::MESSAGE_TYPE,
            AisMessageType::StaticVoyage => StaticVoyage::MESSAGE_TYPE,
        }
    }
}

/// Produces carrier sentences for AIS messages.
///
/// One encoder is shared by every vessel of a simulation so that sequential
/// message ids and channel alternation are continuous on the output.
#[derive(Debug, Clone, Default)]
pub struct AisEncoder {
    framer: Framer,
}

impl AisEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type 1 position report for `state` at `at`.
    pub fn position_report(
        &mut self,
        identity: &VesselIdentity,
        state: &VesselState,
        at: &DateTime<Utc>,
    ) -> Result<Vec<String>, EncodeError> {
        let bits = PositionReport::from_state(identity, state, at).encode()?;
        Ok(self.framer.frame(&armor(&bits)))
    }

    /// Type 5 static and voyage data for `identity`.
    pub fn static_voyage(&mut self, identity: &VesselIdentity) -> Result<Vec<String>, EncodeError> {
        let bits = StaticVoyage::from_identity(identity).encode()?;
        Ok(self.framer.frame(&armor(&bits)))
    }

    /// Encode one message type.
    pub fn encode_message(
        &mut self,
        message: AisMessageType,
        identity: &VesselIdentity,
        state: &VesselState,
        at: &DateTime<Utc>,
    ) -> Result<Vec<String>, EncodeError> {
        match message {
            AisMessageType::PositionReport => self.position_report(identity, state, at),
            AisMessageType::StaticVoyage => self.static_voyage(identity),
        }
    }

    /// Position report followed by static data.
    pub fn encode(
        &mut self,
        identity: &VesselIdentity,
        state: &VesselState,
        at: &DateTime<Utc>,
    ) -> Result<Vec<String>, EncodeError> {
        let mut sentences = self.position_report(identity, state, at)?;
        sentences.extend(self.static_voyage(identity)?);
        Ok(sentences)
    }
}
