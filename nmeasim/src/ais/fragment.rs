//! `!AIVDM` carrier sentences.
//!
//! An armored payload longer than [`MAX_FRAGMENT_PAYLOAD`] characters is
//! split across several sentences sharing a sequential message id. The
//! radio channel alternates between A and B from one message to the next.

use std::fmt;

use super::armor::{dearmor, Armored};
use super::bits::Bits;
use crate::nmea0183::checksum;

/// Most payload characters carried by one sentence.
pub const MAX_FRAGMENT_PAYLOAD: usize = 60;

/// VHF data link channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    #[default]
    A,
    B,
}

impl Channel {
    fn other(self) -> Self {
        match self {
            Channel::A => Channel::B,
            Channel::B => Channel::A,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::A => write!(f, "A"),
            Channel::B => write!(f, "B"),
        }
    }
}

/// Wraps armored payloads into carrier sentences.
///
/// Holds the rolling sequential message id (0-9) and the next channel.
#[derive(Debug, Clone, Default)]
pub struct Framer {
    next_sequence: u8,
    next_channel: Channel,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One sentence per fragment, each terminated with CRLF.
    ///
    /// Fill bits are reported on the last fragment only.
    pub fn frame(&mut self, armored: &Armored) -> Vec<String> {
        let chunks: Vec<&str> = if armored.payload.is_empty() {
            vec![""]
        } else {
            armored
                .payload
                .as_bytes()
                .chunks(MAX_FRAGMENT_PAYLOAD)
                // Armored payloads are ASCII
                .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
                .collect()
        };
        let total = chunks.len();

        let sequence = if total > 1 {
            let id = self.next_sequence;
            self.next_sequence = (self.next_sequence + 1) % 10;
            id.to_string()
        } else {
            String::new()
        };

        let channel = self.next_channel;
        self.next_channel = channel.other();

        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let fill = if i + 1 == total { armored.fill_bits } else { 0 };
                let body = format!(
                    "AIVDM,{},{},{},{},{},{}",
                    total,
                    i + 1,
                    sequence,
                    channel,
                    chunk,
                    fill
                );
                checksum::frame('!', &body)
            })
            .collect()
    }
}

/// One parsed carrier sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub total: u8,
    pub number: u8,
    pub sequence: Option<u8>,
    pub channel: String,
    pub payload: String,
    pub fill_bits: u8,
}

impl Fragment {
    /// Parse a checksummed `!AIVDM` or `!AIVDO` sentence.
    pub fn parse(sentence: &str) -> Option<Self> {
        let body = checksum::body(sentence)?;
        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() != 7 || !matches!(fields[0], "AIVDM" | "AIVDO") {
            return None;
        }
        Some(Self {
            total: fields[1].parse().ok()?,
            number: fields[2].parse().ok()?,
            sequence: fields[3].parse().ok(),
            channel: fields[4].to_string(),
            payload: fields[5].to_string(),
            fill_bits: fields[6].parse().ok()?,
        })
    }
}

/// Concatenate the fragments of one message back into its bits.
///
/// Fragments must be complete and in order.
pub fn reassemble(fragments: &[Fragment]) -> Option<Bits> {
    let last = fragments.last()?;
    let complete = fragments.iter().enumerate().all(|(i, f)| {
        usize::from(f.total) == fragments.len()
            && usize::from(f.number) == i + 1
            && f.sequence == last.sequence
    });
    if !complete {
        return None;
    }
    let payload: String = fragments.iter().map(|f| f.payload.as_str()).collect();
    dearmor(&payload, last.fill_bits)
}
