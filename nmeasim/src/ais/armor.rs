//! Six-bit ASCII armoring of AIS payloads.

use super::bits::Bits;

/// An armored payload and the number of fill bits appended to reach a
/// six-bit boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Armored {
    pub payload: String,
    pub fill_bits: u8,
}

/// Armor `bits` into payload characters.
///
/// Each six-bit group `v` becomes `v + 48`, or `v + 56` when `v >= 40`, so
/// the alphabet is `0`..`W` followed by `` ` ``..`w`.
pub fn armor(bits: &Bits) -> Armored {
    let mut padded = bits.clone();
    let fill_bits = padded.pad_to(6) as u8;

    let mut reader = padded.reader();
    let mut payload = String::with_capacity(padded.len() / 6);
    while let Some(value) = reader.read_unsigned(6) {
        payload.push(armor_char(value as u8));
    }

    Armored { payload, fill_bits }
}

/// Reverse [`armor`], dropping `fill_bits` trailing bits.
///
/// Returns `None` for characters outside the armoring alphabet or a fill
/// count larger than the payload.
pub fn dearmor(payload: &str, fill_bits: u8) -> Option<Bits> {
    let mut bits = Bits::with_capacity(payload.len() * 6);
    for ch in payload.chars() {
        bits.push_unsigned(u64::from(dearmor_char(ch)?), 6);
    }
    let fill = usize::from(fill_bits);
    if fill > 5 || fill > bits.len() {
        return None;
    }
    bits.truncate(bits.len() - fill);
    Some(bits)
}

fn armor_char(value: u8) -> char {
    if value < 40 {
        (value + 48) as char
    } else {
        (value + 56) as char
    }
}

fn dearmor_char(ch: char) -> Option<u8> {
    match ch {
        '0'..='W' => Some(ch as u8 - 48),
        '`'..='w' => Some(ch as u8 - 56),
        _ => None,
    }
}
