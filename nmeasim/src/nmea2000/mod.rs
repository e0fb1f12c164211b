//! NMEA 2000 output: PGN payloads, CAN framing and wire formats.
//!
//! # Architecture
//!
//! ```text
//! SentenceContext ──build──► N2kMessage (payload bytes)
//!                                 │
//!                                 ├─ ≤ 8 bytes: one CAN frame
//!                                 └─ > 8 bytes: fast packet frames
//!                                 │
//!                          N2kFormat::write ──► Bytes
//! ```

mod fields;
mod frame;
mod messages;
mod pgn;

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use frame::{
    fast_packet, reassemble_fast_packet, CanFrame, CanId, N2kFormat, MAX_FAST_PACKET_LEN,
};
pub use messages::{N2kMessage, BROADCAST};
pub use pgn::Pgn;

use crate::error::EncodeError;
use crate::nmea0183::SentenceContext;
use crate::vessel::VesselIdentity;

/// Default source address of the simulated device.
pub const DEFAULT_SOURCE_ADDRESS: u8 = 0x23;

/// Builds and frames PGNs.
///
/// Keeps the sequence identifier shared by the PGNs of one tick and the
/// per-PGN fast-packet counters.
#[derive(Debug, Clone)]
pub struct N2kEncoder {
    source: u8,
    format: N2kFormat,
    sid: u8,
    fast_packet_sequence: HashMap<Pgn, u8>,
}

impl Default for N2kEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_ADDRESS, N2kFormat::default())
    }
}

impl N2kEncoder {
    pub fn new(source: u8, format: N2kFormat) -> Self {
        Self {
            source,
            format,
            sid: 0,
            fast_packet_sequence: HashMap::new(),
        }
    }

    pub fn format(&self) -> N2kFormat {
        self.format
    }

    /// Advance the sequence identifier tying together one tick's PGNs.
    ///
    /// SID 255 means "not tied", so the counter wraps at 253.
    pub fn next_tick(&mut self) {
        self.sid = if self.sid >= 252 { 0 } else { self.sid + 1 };
    }

    /// Messages for `pgn` describing the vessel in `ctx`.
    pub fn messages(
        &self,
        pgn: Pgn,
        ctx: &SentenceContext<'_>,
        identity: &VesselIdentity,
    ) -> Result<Vec<N2kMessage>, EncodeError> {
        Ok(messages::build(pgn, self.sid, ctx, identity)?
            .into_iter()
            .map(|data| N2kMessage {
                pgn,
                priority: pgn.priority(),
                source: self.source,
                destination: BROADCAST,
                data,
            })
            .collect())
    }

    /// CAN frames for one message.
    pub fn frames(&mut self, message: &N2kMessage) -> Result<Vec<CanFrame>, EncodeError> {
        let id = CanId {
            priority: message.priority,
            pgn: message.pgn.number(),
            source: message.source,
            destination: message.destination,
        }
        .to_raw();

        if message.pgn.is_fast_packet() {
            let counter = self.fast_packet_sequence.entry(message.pgn).or_insert(0);
            let sequence = *counter;
            *counter = (*counter + 1) & 0x07;
            fast_packet(id, sequence, &message.data)
        } else {
            if message.data.len() > 8 {
                return Err(EncodeError::PayloadTooLarge {
                    len: message.data.len(),
                    max: 8,
                });
            }
            Ok(vec![CanFrame {
                id,
                data: message.data.clone(),
            }])
        }
    }

    /// Build, frame and serialize `pgn`, one wire record per message.
    pub fn encode(
        &mut self,
        pgn: Pgn,
        ctx: &SentenceContext<'_>,
        identity: &VesselIdentity,
    ) -> Result<Vec<Bytes>, EncodeError> {
        let at: DateTime<Utc> = ctx.time;
        let format = self.format;
        self.messages(pgn, ctx, identity)?
            .iter()
            .map(|message| Ok(format.write(&self.frames(message)?, &at)))
            .collect()
    }
}
