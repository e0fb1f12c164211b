//! Finished output units and the per-tick batch that carries them.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::ais::AisMessageType;
use crate::nmea0183::SentenceKind;
use crate::nmea2000::Pgn;
use crate::vessel::Mmsi;

/// Everything produced in one tick, in emission order.
pub type Batch = Arc<[EncodedSentence]>;

/// Which vessel an output describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The simulated own ship.
    OwnShip(Mmsi),
    /// An AIS traffic vessel.
    Traffic(Mmsi),
}

impl Source {
    pub fn mmsi(&self) -> Mmsi {
        match self {
            Source::OwnShip(mmsi) | Source::Traffic(mmsi) => *mmsi,
        }
    }

    pub fn is_own_ship(&self) -> bool {
        matches!(self, Source::OwnShip(_))
    }
}

/// What an output record contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// NMEA 0183 `$` sentence.
    Sentence(SentenceKind),
    /// One or more `!AIVDM` fragments of an AIS message.
    Ais(AisMessageType),
    /// NMEA 2000 parameter group in its configured wire format.
    Pgn(Pgn),
}

impl OutputKind {
    /// True for the ASCII NMEA 0183 family, AIS included.
    pub fn is_nmea0183(&self) -> bool {
        !matches!(self, OutputKind::Pgn(_))
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Sentence(kind) => write!(f, "{}", kind),
            OutputKind::Ais(message) => write!(f, "AIS type {}", message.code()),
            OutputKind::Pgn(pgn) => write!(f, "PGN {}", pgn.number()),
        }
    }
}

/// One complete wire record including its framing terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSentence {
    /// Simulated UTC of the tick that produced it.
    pub timestamp: DateTime<Utc>,
    pub source: Source,
    pub kind: OutputKind,
    pub payload: Bytes,
}

impl EncodedSentence {
    /// The payload as text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}
