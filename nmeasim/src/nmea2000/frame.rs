//! CAN framing: 29-bit identifiers, fast-packet splitting and wire formats.

use std::fmt::Write as _;

use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// Largest payload the fast-packet protocol can carry.
pub const MAX_FAST_PACKET_LEN: usize = 223;

/// 29-bit extended CAN identifier fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanId {
    pub priority: u8,
    pub pgn: u32,
    pub source: u8,
    pub destination: u8,
}

impl CanId {
    /// Pack into the 29-bit identifier.
    ///
    /// PDU1 PGNs (PF < 240) carry the destination address in the PS byte;
    /// PDU2 PGNs carry their group extension there.
    pub fn to_raw(&self) -> u32 {
        let pf = (self.pgn >> 8) & 0xFF;
        let pgn_bits = if pf < 240 {
            (self.pgn & 0x3FF00) | u32::from(self.destination)
        } else {
            self.pgn & 0x3FFFF
        };
        (u32::from(self.priority & 0x07) << 26) | (pgn_bits << 8) | u32::from(self.source)
    }

    /// Unpack a 29-bit identifier.
    pub fn from_raw(raw: u32) -> Self {
        let priority = ((raw >> 26) & 0x07) as u8;
        let source = (raw & 0xFF) as u8;
        let pf = (raw >> 16) & 0xFF;
        let ps = ((raw >> 8) & 0xFF) as u8;
        let dp = (raw >> 24) & 0x03;
        if pf < 240 {
            Self {
                priority,
                pgn: (dp << 16) | (pf << 8),
                source,
                destination: ps,
            }
        } else {
            Self {
                priority,
                pgn: (dp << 16) | (pf << 8) | u32::from(ps),
                source,
                destination: 255,
            }
        }
    }
}

/// One CAN frame of up to 8 data bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    pub id: u32,
    pub data: Vec<u8>,
}

/// Split `payload` into fast-packet frames with sequence counter `sequence`.
///
/// The first frame carries the total length and 6 data bytes, later frames 7.
/// The last frame is padded with 0xFF.
pub fn fast_packet(id: u32, sequence: u8, payload: &[u8]) -> Result<Vec<CanFrame>, EncodeError> {
    if payload.len() > MAX_FAST_PACKET_LEN {
        return Err(EncodeError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_FAST_PACKET_LEN,
        });
    }
    let seq = (sequence & 0x07) << 5;

    let first_len = payload.len().min(6);
    let mut frames = Vec::with_capacity(1 + payload.len().saturating_sub(6).div_ceil(7));

    let mut first = vec![seq, payload.len() as u8];
    first.extend_from_slice(&payload[..first_len]);
    first.resize(8, 0xFF);
    frames.push(CanFrame { id, data: first });

    for (i, chunk) in payload[first_len..].chunks(7).enumerate() {
        let mut data = Vec::with_capacity(8);
        data.push(seq | (i as u8 + 1));
        data.extend_from_slice(chunk);
        data.resize(8, 0xFF);
        frames.push(CanFrame { id, data });
    }
    Ok(frames)
}

/// Reassemble the payload of one fast-packet message.
pub fn reassemble_fast_packet(frames: &[CanFrame]) -> Option<Vec<u8>> {
    let first = frames.first()?;
    let seq = first.data.first()? & 0xE0;
    let len = usize::from(*first.data.get(1)?);

    let mut payload = first.data.get(2..)?.to_vec();
    for (i, frame) in frames[1..].iter().enumerate() {
        let header = *frame.data.first()?;
        if header & 0xE0 != seq || usize::from(header & 0x1F) != i + 1 {
            return None;
        }
        payload.extend_from_slice(frame.data.get(1..)?);
    }
    if payload.len() < len {
        return None;
    }
    payload.truncate(len);
    Some(payload)
}

/// Wire representation of CAN frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum N2kFormat {
    /// 4-byte little-endian CAN id, DLC byte, data bytes.
    #[default]
    RawBinary,
    /// `hh:mm:ss.mmm R 0CCCCCCC dd dd ..` text lines.
    ActisenseRawAscii,
}

impl N2kFormat {
    /// Serialize `frames` received at `at`.
    pub fn write(&self, frames: &[CanFrame], at: &DateTime<Utc>) -> Bytes {
        match self {
            N2kFormat::RawBinary => {
                let mut buf = BytesMut::with_capacity(frames.len() * 13);
                for frame in frames {
                    buf.put_u32_le(frame.id);
                    buf.put_u8(frame.data.len() as u8);
                    buf.put_slice(&frame.data);
                }
                buf.freeze()
            }
            N2kFormat::ActisenseRawAscii => {
                let stamp = format!(
                    "{:02}:{:02}:{:02}.{:03}",
                    at.hour(),
                    at.minute(),
                    at.second(),
                    at.timestamp_subsec_millis().min(999)
                );
                let mut text = String::with_capacity(frames.len() * 48);
                for frame in frames {
                    let _ = write!(text, "{} R {:08X}", stamp, frame.id);
                    for byte in &frame.data {
                        let _ = write!(text, " {:02X}", byte);
                    }
                    text.push_str("\r\n");
                }
                Bytes::from(text)
            }
        }
    }
}
